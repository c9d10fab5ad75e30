// handlers/protected/memories/collection.rs - GET/POST /api/memories, /trip/:tripId and /spot/:spotId

use axum::extract::State;
use tracing::debug;

use crate::api::{FormPayload, FromFields, QueryFields, ResourceId};
use crate::database::models::{MemoryFilter, MemoryView, NewMemory};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Created};
use crate::services::UploadKind;
use crate::state::AppState;

/// GET /api/memories - `?trip_id=&spot_id=&emotion=`
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    QueryFields(query): QueryFields,
) -> ApiResult<Vec<MemoryView>> {
    let filter = MemoryFilter::from_fields(&query)?;
    let memories = state.memories.list(user.user_id, &filter).await?;
    Ok(ApiResponse::success(memories))
}

pub async fn by_trip(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<Vec<MemoryView>> {
    let filter = MemoryFilter {
        trip_id: Some(trip_id),
        ..MemoryFilter::default()
    };
    let memories = state.memories.list(user.user_id, &filter).await?;
    Ok(ApiResponse::success(memories))
}

pub async fn by_spot(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(spot_id): ResourceId,
) -> ApiResult<Vec<MemoryView>> {
    let memories = state.memories.by_spot(user.user_id, spot_id).await?;
    Ok(ApiResponse::success(memories))
}

/// POST /api/memories - accepts an optional `media` image or video
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    payload: FormPayload,
) -> ApiResult<Created> {
    let mut input = NewMemory::from_fields(&payload.fields)?;
    let pending = state.uploads.accept(payload.files, UploadKind::Media)?;

    let (owner, memories) = (user.user_id, &state.memories);
    let memory = state
        .uploads
        .attach(pending, move |url| {
            input.fields.media_url = url;
            async move { memories.create(owner, input).await.map_err(ApiError::from) }
        })
        .await?;

    debug!("Memory {} saved on trip {}", memory.memory.id, memory.memory.trip_id);
    Ok(ApiResponse::created(
        Created::new(memory.memory.id, "Memory saved")
            .with_file(UploadKind::Media.response_key(), memory.memory.media_url),
    ))
}
