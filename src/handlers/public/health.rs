// handlers/public/health.rs - GET /api/health handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use tracing::error;

use crate::database::health_check;
use crate::state::AppState;

/// GET /api/health - 200 while the database answers, 503 otherwise
pub async fn health_get(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = Utc::now().to_rfc3339();

    match health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "OK", "timestamp": timestamp })),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "status": "UNAVAILABLE",
                    "error": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "timestamp": timestamp
                })),
            )
        }
    }
}
