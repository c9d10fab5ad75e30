#![allow(dead_code)]

use std::net::SocketAddr;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::task::JoinHandle;

use trip_planner_api::config::AppConfig;
use trip_planner_api::database::connect_and_migrate;
use trip_planner_api::router;
use trip_planner_api::state::AppState;

/// The real router on an ephemeral port, backed by a throwaway database and
/// upload directory. Dropped at the end of each test.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub dir: TempDir,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(adjust: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let dir = tempfile::tempdir().context("temp dir")?;

        let mut config = AppConfig::development();
        config.database.url = format!("sqlite://{}", dir.path().join("app.db").display());
        config.uploads.directory = dir.path().join("uploads");
        config.security.jwt_secret = "integration-test-secret".to_string();
        config.security.bcrypt_cost = 4;
        config.api.auth_rate_limit_attempts = 1000;
        config.api.enable_request_logging = false;
        adjust(&mut config);

        let pool = connect_and_migrate(&config.database).await?;
        let state = AppState::new(config, pool)?;
        let app = router::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            dir,
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.client.request(method, self.url(path)).bearer_auth(token)
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        send(self.request(Method::GET, path, token)).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.request(Method::POST, path, token).json(&body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.request(Method::PUT, path, token).json(&body)).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.request(Method::PATCH, path, token).json(&body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        send(self.request(Method::DELETE, path, token)).await
    }

    /// Register and return the issued token
    pub async fn register(&self, username: &str, password: &str) -> Result<String> {
        let (status, body) = send(
            self.client
                .post(self.url("/api/auth/register"))
                .json(&json!({ "username": username, "password": password })),
        )
        .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        token_of(&body)
    }

    /// Create the three-day Kyoto trip and return its id
    pub async fn kyoto_trip(&self, token: &str) -> Result<i64> {
        let (status, body) = self
            .post(
                "/api/trips",
                token,
                json!({
                    "title": "Kyoto",
                    "destination": "Kyoto",
                    "start_date": "2024-04-01",
                    "end_date": "2024-04-03",
                    "budget": 30000
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "trip create failed: {} {}", status, body);
        id_of(&body)
    }

    /// Ids of the trip's generated days, in date order
    pub async fn day_ids(&self, token: &str, trip_id: i64) -> Result<Vec<i64>> {
        let (_, body) = self.get(&format!("/api/trips/{}/days", trip_id), token).await?;
        body.as_array()
            .context("days array")?
            .iter()
            .map(id_of)
            .collect()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn send(request: RequestBuilder) -> Result<(StatusCode, Value)> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).with_context(|| format!("non-JSON body: {}", text))?
    };
    Ok((status, body))
}

pub fn id_of(body: &Value) -> Result<i64> {
    body["id"].as_i64().with_context(|| format!("no id in {}", body))
}

pub fn token_of(body: &Value) -> Result<String> {
    body["token"]
        .as_str()
        .map(str::to_string)
        .with_context(|| format!("no token in {}", body))
}
