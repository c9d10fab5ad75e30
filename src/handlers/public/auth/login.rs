// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::extract::State;

use super::SessionResponse;
use crate::api::requests::auth::Credentials;
use crate::api::{FormPayload, FromFields};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/auth/login - exchange username and password for a JWT
///
/// Unknown users and wrong passwords both answer 401 with the same message.
pub async fn login_post(
    State(state): State<AppState>,
    payload: FormPayload,
) -> ApiResult<SessionResponse> {
    let credentials = Credentials::from_fields(&payload.fields)?;
    let session = state
        .auth
        .login(&credentials.username, &credentials.password)
        .await?;

    Ok(ApiResponse::success(SessionResponse {
        message: "Login successful",
        session,
    }))
}
