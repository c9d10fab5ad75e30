// handlers/public/auth/username.rs - GET /api/auth/check-username/:username handler

use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn check_username_get(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Value> {
    let available = state.auth.is_username_available(&username).await?;
    Ok(ApiResponse::success(json!({ "available": available })))
}
