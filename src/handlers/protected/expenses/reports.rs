// handlers/protected/expenses/reports.rs - GET /api/expenses/trip/:tripId/{summary,daily,budget-comparison}
//
// Amounts are grouped per currency and never summed across currencies.

use axum::extract::State;

use crate::api::ResourceId;
use crate::database::models::{BudgetComparison, DailyExpense, ExpenseSummary};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Totals per category and currency, plus a grand total per currency
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<ExpenseSummary> {
    let summary = state.expenses.category_summary(user.user_id, trip_id).await?;
    Ok(ApiResponse::success(summary))
}

pub async fn daily(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<Vec<DailyExpense>> {
    let days = state.expenses.daily(user.user_id, trip_id).await?;
    Ok(ApiResponse::success(days))
}

/// Spending in the budget currency against the trip budget. 404 when the
/// trip is not the caller's.
pub async fn budget_comparison(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<BudgetComparison> {
    let comparison = state.expenses.budget_comparison(user.user_id, trip_id).await?;
    Ok(ApiResponse::success(comparison))
}
