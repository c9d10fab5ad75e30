mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{id_of, TestServer};

async fn remember(
    server: &TestServer,
    token: &str,
    trip_id: i64,
    spot_id: Option<i64>,
    title: &str,
    emotion: &str,
    weather: &str,
    date: &str,
) -> Result<i64> {
    let (status, body) = server
        .post(
            "/api/memories",
            token,
            json!({
                "trip_id": trip_id,
                "trip_spot_id": spot_id,
                "title": title,
                "emotion": emotion,
                "weather": weather,
                "date": date
            }),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "memory create failed: {}", body);
    id_of(&body)
}

#[tokio::test]
async fn reports_roll_up_memories() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;
    let (_, spot) = server
        .post("/api/trip-spots", &token, json!({"trip_id": trip_id, "name": "Kinkaku-ji"}))
        .await?;
    let spot_id = id_of(&spot)?;

    remember(&server, &token, trip_id, Some(spot_id), "Golden", "happy", "sunny", "2024-04-01").await?;
    remember(&server, &token, trip_id, None, "Noodles", "", "sunny", "2024-04-01").await?;
    remember(&server, &token, trip_id, Some(spot_id), "Rain walk", "happy", "rainy", "2024-04-02").await?;

    let (status, body) = server
        .get(&format!("/api/memories/trip/{}/daily", trip_id), &token)
        .await?;
    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["memory_count"], 2);
    assert_eq!(days[0]["titles"].as_array().unwrap().len(), 2);
    assert_eq!(days[0]["emotions"], json!(["happy"]));

    let (_, body) = server
        .get(&format!("/api/memories/trip/{}/emotions", trip_id), &token)
        .await?;
    assert_eq!(body, json!([{"emotion": "happy", "count": 2}]));

    let (_, body) = server
        .get(&format!("/api/memories/trip/{}/weather", trip_id), &token)
        .await?;
    let weather = body.as_array().unwrap();
    assert_eq!(weather.len(), 2);
    assert_eq!(weather[0]["weather"], "sunny");
    assert_eq!(weather[0]["count"], 2);

    let (_, body) = server
        .get(&format!("/api/memories/trip/{}/stats", trip_id), &token)
        .await?;
    assert_eq!(body["total_memories"], 3);
    assert_eq!(body["memories_with_media"], 0);
    assert_eq!(body["active_days"], 2);
    assert_eq!(body["spots_with_memories"], 1);

    let (_, body) = server.get(&format!("/api/memories/spot/{}", spot_id), &token).await?;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["spot_name"], "Kinkaku-ji");
    Ok(())
}

#[tokio::test]
async fn memory_lifecycle() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;

    let (status, _) = server
        .post("/api/memories", &token, json!({"trip_id": trip_id, "title": "No date"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = remember(&server, &token, trip_id, None, "Tea", "calm", "cloudy", "2024-04-03").await?;
    let path = format!("/api/memories/{}", id);

    let (status, _) = server
        .put(
            &path,
            &token,
            json!({"title": "Matcha", "content": "Uji", "emotion": "calm", "date": "2024-04-03"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    let (_, memory) = server.get(&path, &token).await?;
    assert_eq!(memory["title"], "Matcha");
    assert_eq!(memory["content"], "Uji");
    assert_eq!(memory["weather"], "");

    let (_, body) = server
        .get(&format!("/api/memories/trip/{}", trip_id), &token)
        .await?;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = server.delete(&path, &token).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.get(&path, &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
