// handlers/protected/spots/scoped.rs - GET /api/trip-spots/trip/:tripId and /day/:dayId

use axum::extract::State;

use crate::api::ResourceId;
use crate::database::models::{SpotFilter, SpotView};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

pub async fn by_trip(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<Vec<SpotView>> {
    let filter = SpotFilter {
        trip_id: Some(trip_id),
        ..SpotFilter::default()
    };
    let spots = state.spots.list(user.user_id, &filter).await?;
    Ok(ApiResponse::success(spots))
}

/// Spots of one day in visiting order
pub async fn by_day(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(day_id): ResourceId,
) -> ApiResult<Vec<SpotView>> {
    let spots = state.spots.list_by_day(user.user_id, day_id).await?;
    Ok(ApiResponse::success(spots))
}
