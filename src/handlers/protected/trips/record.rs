// handlers/protected/trips/record.rs - GET/PUT/DELETE /api/trips/:id and PATCH /api/trips/:id/status

use axum::extract::State;

use crate::api::requests::trips::StatusPatch;
use crate::api::{FormPayload, FromFields, ResourceId};
use crate::database::models::{TripChanges, TripDetail};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Message};
use crate::services::UploadKind;
use crate::state::AppState;

/// GET /api/trips/:id - trip with its days and spots
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> ApiResult<TripDetail> {
    let detail = state.trips.detail(user.user_id, id).await?;
    Ok(ApiResponse::success(detail))
}

/// PUT /api/trips/:id - replace the editable fields
///
/// Status is kept unless a valid one is sent; the cover is kept unless a new
/// file is uploaded, in which case the old file is deleted. Existing days are
/// not regenerated.
pub async fn put(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    payload: FormPayload,
) -> ApiResult<Message> {
    let mut changes = TripChanges::from_fields(&payload.fields)?;
    let pending = state.uploads.accept(payload.files, UploadKind::CoverImage)?;

    let (owner, trips) = (user.user_id, &state.trips);
    let replaced = state
        .uploads
        .attach(pending, move |url| {
            changes.cover_image = url;
            async move { trips.update(owner, id, changes).await.map_err(ApiError::from) }
        })
        .await?;
    state.uploads.discard(replaced).await;

    Ok(ApiResponse::success(Message::new("Trip updated")))
}

/// PATCH /api/trips/:id/status - `{"status": "planning" | "ongoing" | "completed" | "cancelled"}`
pub async fn status_patch(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    payload: FormPayload,
) -> ApiResult<Message> {
    let StatusPatch(status) = StatusPatch::from_fields(&payload.fields)?;
    state.trips.set_status(user.user_id, id, status).await?;
    Ok(ApiResponse::success(Message::new("Trip status updated")))
}

/// DELETE /api/trips/:id - removes the trip and everything under it
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> ApiResult<Message> {
    state.trips.delete(user.user_id, id).await?;
    Ok(ApiResponse::success(Message::new("Trip deleted")))
}
