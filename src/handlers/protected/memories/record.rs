// handlers/protected/memories/record.rs - GET/PUT/DELETE /api/memories/:id handlers

use axum::extract::State;

use crate::api::{FormPayload, FromFields, ResourceId};
use crate::database::models::{MemoryFields, MemoryView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Message};
use crate::services::UploadKind;
use crate::state::AppState;

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> ApiResult<MemoryView> {
    let memory = state.memories.get(user.user_id, id).await?;
    Ok(ApiResponse::success(memory))
}

pub async fn put(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    payload: FormPayload,
) -> ApiResult<Message> {
    let mut fields = MemoryFields::from_fields(&payload.fields)?;
    let pending = state.uploads.accept(payload.files, UploadKind::Media)?;

    let (owner, memories) = (user.user_id, &state.memories);
    let replaced = state
        .uploads
        .attach(pending, move |url| {
            fields.media_url = url;
            async move { memories.update(owner, id, fields).await.map_err(ApiError::from) }
        })
        .await?;
    state.uploads.discard(replaced).await;

    Ok(ApiResponse::success(Message::new("Memory updated")))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> ApiResult<Message> {
    state.memories.delete(user.user_id, id).await?;
    Ok(ApiResponse::success(Message::new("Memory deleted")))
}
