// handlers/protected/spots/record.rs - /api/trip-spots/:id handlers

use axum::extract::State;
use serde::Serialize;

use crate::api::requests::spots::{OrderPatch, VisitedPatch};
use crate::api::{FormPayload, FromFields, ResourceId};
use crate::database::models::{SpotFields, SpotView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Message};
use crate::services::UploadKind;
use crate::state::AppState;

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> ApiResult<SpotView> {
    let spot = state.spots.get(user.user_id, id).await?;
    Ok(ApiResponse::success(spot))
}

/// PUT /api/trip-spots/:id - moving to another day appends to that day
pub async fn put(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    payload: FormPayload,
) -> ApiResult<Message> {
    let mut fields = SpotFields::from_fields(&payload.fields)?;
    let pending = state.uploads.accept(payload.files, UploadKind::SpotImage)?;

    let (owner, spots) = (user.user_id, &state.spots);
    let replaced = state
        .uploads
        .attach(pending, move |url| {
            fields.image_url = url;
            async move { spots.update(owner, id, fields).await.map_err(ApiError::from) }
        })
        .await?;
    state.uploads.discard(replaced).await;

    Ok(ApiResponse::success(Message::new("Spot updated")))
}

/// PATCH /api/trip-spots/:id/visited - `{"visited": bool}`, idempotent
pub async fn visited_patch(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    payload: FormPayload,
) -> ApiResult<Message> {
    let VisitedPatch(visited) = VisitedPatch::from_fields(&payload.fields)?;
    state.spots.set_visited(user.user_id, id, visited).await?;
    Ok(ApiResponse::success(Message::new("Visited state updated")))
}

#[derive(Debug, Serialize)]
pub struct OrderUpdated {
    pub message: &'static str,
    pub order_index: i64,
}

/// PATCH /api/trip-spots/:id/order - `{"order_index": n}`
///
/// The index is clamped to the day's size; the answer carries the position
/// the spot actually ended up at.
pub async fn order_patch(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    payload: FormPayload,
) -> ApiResult<OrderUpdated> {
    let OrderPatch(index) = OrderPatch::from_fields(&payload.fields)?;
    let order_index = state.spots.reorder(user.user_id, id, index).await?;
    Ok(ApiResponse::success(OrderUpdated {
        message: "Order updated",
        order_index,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> ApiResult<Message> {
    state.spots.delete(user.user_id, id).await?;
    Ok(ApiResponse::success(Message::new("Spot deleted")))
}
