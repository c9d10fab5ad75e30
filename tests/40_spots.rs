mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::{id_of, send, TestServer};

async fn add_spot(server: &TestServer, token: &str, trip_id: i64, day_id: i64, name: &str) -> Result<i64> {
    let (status, body) = server
        .post(
            "/api/trip-spots",
            token,
            json!({"trip_id": trip_id, "trip_day_id": day_id, "name": name}),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "spot create failed: {}", body);
    id_of(&body)
}

fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|spot| spot["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn spots_append_in_order_and_default_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;
    let days = server.day_ids(&token, trip_id).await?;

    let first = add_spot(&server, &token, trip_id, days[0], "Fushimi Inari").await?;
    add_spot(&server, &token, trip_id, days[0], "Kiyomizu-dera").await?;

    let (status, spot) = server.get(&format!("/api/trip-spots/{}", first), &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(spot["order_index"], 0);
    assert_eq!(spot["duration"], 60);
    assert_eq!(spot["visited"], false);
    assert_eq!(spot["day_date"], "2024-04-01");
    assert_eq!(spot["trip_title"], "Kyoto");

    let (_, body) = server.get(&format!("/api/trip-spots/day/{}", days[0]), &token).await?;
    assert_eq!(names(&body), ["Fushimi Inari", "Kiyomizu-dera"]);
    assert_eq!(body[1]["order_index"], 1);
    Ok(())
}

#[tokio::test]
async fn spot_fields_survive_a_round_trip() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;
    let days = server.day_ids(&token, trip_id).await?;

    let (status, created) = server
        .post(
            "/api/trip-spots",
            &token,
            json!({
                "trip_id": trip_id,
                "trip_day_id": days[2],
                "name": "Ginkaku-ji",
                "category": "temple",
                "lat": 35.027,
                "lng": 135.798,
                "address": "Sakyo-ku",
                "visit_time": "09:30",
                "duration": 90,
                "cost": 500,
                "notes": "Philosopher's Path after",
                "rating": 5
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (_, spot) = server
        .get(&format!("/api/trip-spots/{}", id_of(&created)?), &token)
        .await?;
    assert_eq!(spot["trip_day_id"], days[2]);
    assert_eq!(spot["name"], "Ginkaku-ji");
    assert_eq!(spot["category"], "temple");
    assert_eq!(spot["lat"], 35.027);
    assert_eq!(spot["lng"], 135.798);
    assert_eq!(spot["address"], "Sakyo-ku");
    assert_eq!(spot["visit_time"], "09:30");
    assert_eq!(spot["duration"], 90);
    assert_eq!(spot["cost"], 500.0);
    assert_eq!(spot["notes"], "Philosopher's Path after");
    assert_eq!(spot["rating"], 5);
    Ok(())
}

#[tokio::test]
async fn reorder_moves_and_clamps() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;
    let days = server.day_ids(&token, trip_id).await?;

    let a = add_spot(&server, &token, trip_id, days[0], "A").await?;
    add_spot(&server, &token, trip_id, days[0], "B").await?;
    let c = add_spot(&server, &token, trip_id, days[0], "C").await?;

    let (status, body) = server
        .patch(&format!("/api/trip-spots/{}/order", c), &token, json!({"order_index": 0}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_index"], 0);

    let (_, body) = server
        .patch(&format!("/api/trip-spots/{}/order", a), &token, json!({"order_index": 99}))
        .await?;
    assert_eq!(body["order_index"], 2);

    let (_, body) = server.get(&format!("/api/trip-spots/day/{}", days[0]), &token).await?;
    assert_eq!(names(&body), ["C", "B", "A"]);
    let indices: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|spot| spot["order_index"].as_i64().unwrap())
        .collect();
    assert_eq!(indices, [0, 1, 2]);

    let (status, _) = server
        .patch(&format!("/api/trip-spots/{}/order", a), &token, json!({"order_index": "1"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn visited_toggle_and_filter() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;
    let days = server.day_ids(&token, trip_id).await?;
    let spot = add_spot(&server, &token, trip_id, days[1], "Arashiyama").await?;
    add_spot(&server, &token, trip_id, days[1], "Tenryu-ji").await?;

    let path = format!("/api/trip-spots/{}/visited", spot);
    for _ in 0..2 {
        let (status, _) = server.patch(&path, &token, json!({"visited": true})).await?;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = server.patch(&path, &token, json!({"visited": "yes"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = server
        .get(&format!("/api/trip-spots?trip_id={}&visited=true", trip_id), &token)
        .await?;
    assert_eq!(names(&body), ["Arashiyama"]);

    let (_, body) = server.get(&format!("/api/trip-spots/trip/{}", trip_id), &token).await?;
    assert_eq!(body.as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn spot_validation() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;

    for body in [
        json!({"trip_id": trip_id, "name": "x", "rating": 6}),
        json!({"trip_id": trip_id, "name": "x", "lat": 120}),
        json!({"trip_id": trip_id, "name": "x", "duration": 0}),
        json!({"trip_id": trip_id, "name": "x", "cost": -5}),
        json!({"trip_id": trip_id}),
    ] {
        let (status, _) = server.post("/api/trip-spots", &token, body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = server
        .post("/api/trip-spots", &token, json!({"trip_id": trip_id + 100, "name": "Ghost"}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn moving_a_spot_to_another_day_appends_it() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;
    let days = server.day_ids(&token, trip_id).await?;

    add_spot(&server, &token, trip_id, days[1], "Existing").await?;
    let moving = add_spot(&server, &token, trip_id, days[0], "Mover").await?;

    let (status, _) = server
        .put(
            &format!("/api/trip-spots/{}", moving),
            &token,
            json!({"trip_day_id": days[1], "name": "Mover", "rating": 4}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.get(&format!("/api/trip-spots/day/{}", days[1]), &token).await?;
    assert_eq!(names(&body), ["Existing", "Mover"]);
    assert_eq!(body[1]["order_index"], 1);
    assert_eq!(body[1]["rating"], 4);

    let (status, _) = server.delete(&format!("/api/trip-spots/{}", moving), &token).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn concurrent_creates_on_one_day_all_succeed() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;
    let days = server.day_ids(&token, trip_id).await?;

    let creates: Vec<_> = (0..20)
        .map(|i| {
            let request = server
                .request(Method::POST, "/api/trip-spots", &token)
                .json(&json!({"trip_id": trip_id, "trip_day_id": days[0], "name": format!("Stop {}", i)}));
            tokio::spawn(send(request))
        })
        .collect();
    for create in creates {
        let (status, body) = create.await??;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let (_, body) = server.get(&format!("/api/trip-spots/day/{}", days[0]), &token).await?;
    let mut indices: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|spot| spot["order_index"].as_i64().unwrap())
        .collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..20).collect::<Vec<i64>>());
    Ok(())
}
