// handlers/protected/auth/profile.rs - GET /api/auth/profile handler

use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/auth/profile - the signed-in user's account
pub async fn profile_get(State(state): State<AppState>, user: AuthUser) -> ApiResult<Value> {
    let profile = state.auth.profile(user.user_id).await?;
    Ok(ApiResponse::success(json!({ "user": profile })))
}
