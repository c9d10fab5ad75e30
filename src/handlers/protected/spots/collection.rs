// handlers/protected/spots/collection.rs - GET/POST /api/trip-spots handlers

use axum::extract::State;
use tracing::debug;

use crate::api::{FormPayload, FromFields, QueryFields};
use crate::database::models::{NewSpot, SpotFilter, SpotView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Created};
use crate::services::UploadKind;
use crate::state::AppState;

/// GET /api/trip-spots - `?trip_id=&day_id=&visited=`
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    QueryFields(query): QueryFields,
) -> ApiResult<Vec<SpotView>> {
    let filter = SpotFilter::from_fields(&query)?;
    let spots = state.spots.list(user.user_id, &filter).await?;
    Ok(ApiResponse::success(spots))
}

/// POST /api/trip-spots - append a spot to its day (or to the trip's
/// unscheduled spots). Accepts an optional `image` file.
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    payload: FormPayload,
) -> ApiResult<Created> {
    let mut input = NewSpot::from_fields(&payload.fields)?;
    let pending = state.uploads.accept(payload.files, UploadKind::SpotImage)?;

    let (owner, spots) = (user.user_id, &state.spots);
    let spot = state
        .uploads
        .attach(pending, move |url| {
            input.fields.image_url = url;
            async move { spots.create(owner, input).await.map_err(ApiError::from) }
        })
        .await?;

    debug!("Spot {} added to trip {}", spot.spot.id, spot.spot.trip_id);
    Ok(ApiResponse::created(
        Created::new(spot.spot.id, "Spot added")
            .with_file(UploadKind::SpotImage.response_key(), spot.spot.image_url),
    ))
}
