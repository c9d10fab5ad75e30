// handlers/protected/trip_days/record.rs - GET/PUT/DELETE /api/trip-days/:id handlers

use axum::extract::State;

use crate::api::{FormPayload, FromFields, ResourceId};
use crate::database::models::{TripDay, TripDayChanges};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Message};
use crate::state::AppState;

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> ApiResult<TripDay> {
    let day = state.trip_days.get(user.user_id, id).await?;
    Ok(ApiResponse::success(day))
}

/// PUT /api/trip-days/:id - fields left out keep their value
pub async fn put(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    payload: FormPayload,
) -> ApiResult<Message> {
    let changes = TripDayChanges::from_fields(&payload.fields)?;
    state.trip_days.update(user.user_id, id, changes).await?;
    Ok(ApiResponse::success(Message::new("Trip day updated")))
}

/// DELETE /api/trip-days/:id - the day's spots go with it
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> ApiResult<Message> {
    state.trip_days.delete(user.user_id, id).await?;
    Ok(ApiResponse::success(Message::new("Trip day deleted")))
}
