// handlers/protected/expenses/record.rs - GET/PUT/DELETE /api/expenses/:id handlers

use axum::extract::State;

use crate::api::{FormPayload, FromFields, ResourceId};
use crate::database::models::{ExpenseFields, ExpenseView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Message};
use crate::services::UploadKind;
use crate::state::AppState;

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> ApiResult<ExpenseView> {
    let expense = state.expenses.get(user.user_id, id).await?;
    Ok(ApiResponse::success(expense))
}

/// PUT /api/expenses/:id - the receipt is kept unless a new one is uploaded
pub async fn put(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    payload: FormPayload,
) -> ApiResult<Message> {
    let mut fields = ExpenseFields::from_fields(&payload.fields)?;
    let pending = state.uploads.accept(payload.files, UploadKind::Receipt)?;

    let (owner, expenses) = (user.user_id, &state.expenses);
    let replaced = state
        .uploads
        .attach(pending, move |url| {
            fields.receipt_image = url;
            async move { expenses.update(owner, id, fields).await.map_err(ApiError::from) }
        })
        .await?;
    state.uploads.discard(replaced).await;

    Ok(ApiResponse::success(Message::new("Expense updated")))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> ApiResult<Message> {
    state.expenses.delete(user.user_id, id).await?;
    Ok(ApiResponse::success(Message::new("Expense deleted")))
}
