mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{id_of, TestServer};

#[tokio::test]
async fn budget_comparison_keeps_currencies_apart() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;

    let (status, _) = server
        .post(
            "/api/expenses",
            &token,
            json!({"trip_id": trip_id, "category": "transport", "amount": 5000, "currency": "JPY", "date": "2024-04-01"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = server
        .post(
            "/api/expenses",
            &token,
            json!({"trip_id": trip_id, "category": "food", "amount": 20, "currency": "usd", "date": "2024-04-02"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server
        .get(&format!("/api/expenses/trip/{}/budget-comparison", trip_id), &token)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budget"], 30000.0);
    assert_eq!(body["currency"], "JPY");
    assert_eq!(body["total_spent"], 5000.0);
    assert_eq!(body["remaining"], 25000.0);
    assert_eq!(body["spent_percentage"], 16.67);
    assert_eq!(body["expense_count"], 1);
    assert_eq!(body["over_budget"], false);
    assert_eq!(body["other_currencies"][0]["currency"], "USD");
    assert_eq!(body["other_currencies"][0]["grand_total"], 20.0);
    Ok(())
}

#[tokio::test]
async fn summary_and_daily_rollups() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;

    for (category, amount, date) in [
        ("food", 1000, "2024-04-01"),
        ("food", 2000, "2024-04-01"),
        ("lodging", 9000, "2024-04-02"),
    ] {
        server
            .post(
                "/api/expenses",
                &token,
                json!({"trip_id": trip_id, "category": category, "amount": amount, "date": date}),
            )
            .await?;
    }

    let (status, body) = server
        .get(&format!("/api/expenses/trip/{}/summary", trip_id), &token)
        .await?;
    assert_eq!(status, StatusCode::OK);
    let by_category = body["by_category"].as_array().unwrap();
    assert_eq!(by_category[0]["category"], "lodging");
    assert_eq!(by_category[1]["category"], "food");
    assert_eq!(by_category[1]["count"], 2);
    assert_eq!(by_category[1]["avg_amount"], 1500.0);
    assert_eq!(body["totals"][0]["grand_total"], 12000.0);

    let (_, body) = server
        .get(&format!("/api/expenses/trip/{}/daily", trip_id), &token)
        .await?;
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2024-04-01");
    assert_eq!(days[0]["total_amount"], 3000.0);

    let (_, body) = server
        .get(&format!("/api/expenses?trip_id={}&category=food", trip_id), &token)
        .await?;
    assert_eq!(body.as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn expense_validation_and_lifecycle() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;

    for body in [
        json!({"trip_id": trip_id, "category": "food", "amount": 0, "date": "2024-04-01"}),
        json!({"trip_id": trip_id, "category": "food", "amount": 10, "currency": "YEN1", "date": "2024-04-01"}),
        json!({"trip_id": trip_id, "category": "food", "amount": 10}),
        json!({"category": "food", "amount": 10, "date": "2024-04-01"}),
    ] {
        let (status, _) = server.post("/api/expenses", &token, body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, created) = server
        .post(
            "/api/expenses",
            &token,
            json!({"trip_id": trip_id, "category": "food", "description": "Ramen", "amount": 1200, "date": "2024-04-01"}),
        )
        .await?;
    let expense_id = id_of(&created)?;
    assert!(created["receiptImage"].is_null());

    let path = format!("/api/expenses/{}", expense_id);
    let (status, _) = server
        .put(
            &path,
            &token,
            json!({"category": "food", "description": "Ramen and gyoza", "amount": 1800, "date": "2024-04-01"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    let (_, expense) = server.get(&path, &token).await?;
    assert_eq!(expense["amount"], 1800.0);
    assert_eq!(expense["currency"], "JPY");
    assert_eq!(expense["trip_title"], "Kyoto");

    let (status, _) = server.delete(&path, &token).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.get(&path, &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_a_spot_unlinks_its_expenses() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("alice", "secret1").await?;
    let trip_id = server.kyoto_trip(&token).await?;

    let (_, spot) = server
        .post("/api/trip-spots", &token, json!({"trip_id": trip_id, "name": "Nishiki Market"}))
        .await?;
    let spot_id = id_of(&spot)?;
    let (_, expense) = server
        .post(
            "/api/expenses",
            &token,
            json!({"trip_id": trip_id, "trip_spot_id": spot_id, "category": "food", "amount": 700, "date": "2024-04-02"}),
        )
        .await?;
    let path = format!("/api/expenses/{}", id_of(&expense)?);

    let (_, body) = server.get(&path, &token).await?;
    assert_eq!(body["spot_name"], "Nishiki Market");

    server.delete(&format!("/api/trip-spots/{}", spot_id), &token).await?;
    let (status, body) = server.get(&path, &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["trip_spot_id"].is_null());
    Ok(())
}
