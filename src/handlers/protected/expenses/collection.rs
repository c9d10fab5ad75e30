// handlers/protected/expenses/collection.rs - GET/POST /api/expenses and GET /api/expenses/trip/:tripId

use axum::extract::State;
use tracing::debug;

use crate::api::{FormPayload, FromFields, QueryFields, ResourceId};
use crate::database::models::{ExpenseFilter, ExpenseView, NewExpense};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Created};
use crate::services::UploadKind;
use crate::state::AppState;

/// GET /api/expenses - `?trip_id=&category=&currency=`, newest date first
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    QueryFields(query): QueryFields,
) -> ApiResult<Vec<ExpenseView>> {
    let filter = ExpenseFilter::from_fields(&query)?;
    let expenses = state.expenses.list(user.user_id, &filter).await?;
    Ok(ApiResponse::success(expenses))
}

pub async fn by_trip(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<Vec<ExpenseView>> {
    let filter = ExpenseFilter {
        trip_id: Some(trip_id),
        ..ExpenseFilter::default()
    };
    let expenses = state.expenses.list(user.user_id, &filter).await?;
    Ok(ApiResponse::success(expenses))
}

/// POST /api/expenses - accepts an optional `receipt` image or PDF
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    payload: FormPayload,
) -> ApiResult<Created> {
    let mut input = NewExpense::from_fields(&payload.fields)?;
    let pending = state.uploads.accept(payload.files, UploadKind::Receipt)?;

    let (owner, expenses) = (user.user_id, &state.expenses);
    let expense = state
        .uploads
        .attach(pending, move |url| {
            input.fields.receipt_image = url;
            async move { expenses.create(owner, input).await.map_err(ApiError::from) }
        })
        .await?;

    debug!("Expense {} recorded on trip {}", expense.expense.id, expense.expense.trip_id);
    Ok(ApiResponse::created(
        Created::new(expense.expense.id, "Expense recorded")
            .with_file(UploadKind::Receipt.response_key(), expense.expense.receipt_image),
    ))
}
