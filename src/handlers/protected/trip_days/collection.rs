// handlers/protected/trip_days/collection.rs - GET/POST /api/trips/:id/days handlers

use axum::extract::State;

use crate::api::{FormPayload, FromFields, ResourceId};
use crate::database::models::{NewTripDay, TripDay};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Created};
use crate::state::AppState;

/// GET /api/trips/:id/days - the trip's days by date
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<Vec<TripDay>> {
    let days = state.trip_days.list(user.user_id, trip_id).await?;
    Ok(ApiResponse::success(days))
}

/// POST /api/trips/:id/days - add a day inside the trip's date range
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
    payload: FormPayload,
) -> ApiResult<Created> {
    let input = NewTripDay::from_fields(&payload.fields)?;
    let day = state.trip_days.create(user.user_id, trip_id, input).await?;
    Ok(ApiResponse::created(Created::new(day.id, "Trip day created")))
}
