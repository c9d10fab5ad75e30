// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::extract::State;

use super::SessionResponse;
use crate::api::requests::auth::Credentials;
use crate::api::{FormPayload, FromFields};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/auth/register - create an account and sign it in
pub async fn register_post(
    State(state): State<AppState>,
    payload: FormPayload,
) -> ApiResult<SessionResponse> {
    let credentials = Credentials::from_fields(&payload.fields)?;
    let session = state
        .auth
        .register(&credentials.username, &credentials.password)
        .await?;

    Ok(ApiResponse::created(SessionResponse {
        message: "User registered successfully",
        session,
    }))
}
