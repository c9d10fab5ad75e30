use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// Currency trip budgets are expressed in
pub const BUDGET_CURRENCY: &str = "JPY";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub trip_id: i64,
    pub trip_spot_id: Option<i64>,
    pub user_id: i64,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    pub date: NaiveDate,
    pub payment_method: String,
    pub receipt_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExpenseView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub expense: Expense,
    pub spot_name: Option<String>,
    pub spot_category: Option<String>,
    pub trip_title: String,
}

#[derive(Debug, Clone)]
pub struct ExpenseFields {
    pub trip_spot_id: Option<i64>,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    pub date: NaiveDate,
    pub payment_method: String,
    /// `None` keeps the stored receipt on update
    pub receipt_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub trip_id: i64,
    pub fields: ExpenseFields,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub trip_id: Option<i64>,
    pub category: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryTotal {
    pub category: String,
    pub currency: String,
    pub count: i64,
    pub total_amount: f64,
    pub avg_amount: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CurrencyTotal {
    pub currency: String,
    pub grand_total: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseSummary {
    pub by_category: Vec<CategoryTotal>,
    pub totals: Vec<CurrencyTotal>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyExpense {
    pub date: NaiveDate,
    pub currency: String,
    pub count: i64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetComparison {
    pub budget: f64,
    pub currency: &'static str,
    pub total_spent: f64,
    pub remaining: f64,
    pub spent_percentage: f64,
    pub expense_count: i64,
    pub over_budget: bool,
    /// Spending in other currencies, never folded into `total_spent`
    pub other_currencies: Vec<CurrencyTotal>,
}

impl BudgetComparison {
    /// Compare a budget with the spending recorded in its currency.
    pub fn compute(
        budget: f64,
        spent: &CurrencyTotal,
        other_currencies: Vec<CurrencyTotal>,
    ) -> Self {
        let total_spent = spent.grand_total;
        let spent_percentage = if budget > 0.0 {
            (total_spent / budget * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            budget,
            currency: BUDGET_CURRENCY,
            total_spent,
            remaining: budget - total_spent,
            spent_percentage,
            expense_count: spent.count,
            over_budget: total_spent > budget && budget > 0.0,
            other_currencies,
        }
    }
}
