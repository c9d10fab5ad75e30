// handlers/protected/trips/collection.rs - GET/POST /api/trips handlers

use axum::extract::State;
use tracing::info;

use crate::api::{FormPayload, FromFields, QueryFields};
use crate::database::models::{NewTrip, TripFilter, TripSummary};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Created};
use crate::services::UploadKind;
use crate::state::AppState;

/// GET /api/trips - the caller's trips with counts, newest first
///
/// `?status=` narrows to one lifecycle state.
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    QueryFields(query): QueryFields,
) -> ApiResult<Vec<TripSummary>> {
    let filter = TripFilter::from_fields(&query)?;
    let trips = state.trips.list(user.user_id, &filter).await?;
    Ok(ApiResponse::success(trips))
}

/// POST /api/trips - create a trip and one day per date in its range
///
/// Accepts an optional `cover_image` file.
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    payload: FormPayload,
) -> ApiResult<Created> {
    let mut input = NewTrip::from_fields(&payload.fields)?;
    let pending = state.uploads.accept(payload.files, UploadKind::CoverImage)?;

    let (owner, trips) = (user.user_id, &state.trips);
    let trip = state
        .uploads
        .attach(pending, move |url| {
            input.cover_image = url;
            async move { trips.create(owner, input).await.map_err(ApiError::from) }
        })
        .await?;

    info!("User {} created trip {}", user.user_id, trip.id);
    Ok(ApiResponse::created(
        Created::new(trip.id, "Trip created")
            .with_file(UploadKind::CoverImage.response_key(), trip.cover_image),
    ))
}
