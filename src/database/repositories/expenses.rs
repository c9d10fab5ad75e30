use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::database::manager::{begin_write, DatabaseError};
use crate::database::models::{
    BudgetComparison, CategoryTotal, CurrencyTotal, DailyExpense, Expense, ExpenseFields,
    ExpenseFilter, ExpenseSummary, ExpenseView, NewExpense, BUDGET_CURRENCY,
};

use super::{ensure_spot_in_trip, ensure_trip_owned, replaced_file};

const EXPENSE_VIEW: &str = r#"
    SELECT e.*, s.name AS spot_name, s.category AS spot_category, t.title AS trip_title
    FROM trip_expenses e
    JOIN trips t ON t.id = e.trip_id
    LEFT JOIN trip_spots s ON s.id = e.trip_spot_id
"#;

#[derive(Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner: i64, filter: &ExpenseFilter) -> Result<Vec<ExpenseView>, DatabaseError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(EXPENSE_VIEW);
        query.push(" WHERE e.user_id = ");
        query.push_bind(owner);

        if let Some(trip_id) = filter.trip_id {
            query.push(" AND e.trip_id = ");
            query.push_bind(trip_id);
        }
        if let Some(category) = &filter.category {
            query.push(" AND e.category = ");
            query.push_bind(category.clone());
        }
        if let Some(currency) = &filter.currency {
            query.push(" AND e.currency = ");
            query.push_bind(currency.clone());
        }
        query.push(" ORDER BY e.date DESC, e.created_at DESC, e.id DESC");

        let expenses = query.build_query_as::<ExpenseView>().fetch_all(&self.pool).await?;
        Ok(expenses)
    }

    pub async fn get(&self, owner: i64, id: i64) -> Result<ExpenseView, DatabaseError> {
        let sql = format!("{} WHERE e.id = ? AND e.user_id = ?", EXPENSE_VIEW);
        sqlx::query_as::<_, ExpenseView>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound("Expense"))
    }

    pub async fn create(&self, owner: i64, input: NewExpense) -> Result<ExpenseView, DatabaseError> {
        let NewExpense { trip_id, fields } = input;
        let mut tx = begin_write(&self.pool).await?;

        ensure_trip_owned(&mut tx, owner, trip_id).await?;
        ensure_spot_in_trip(&mut tx, owner, trip_id, fields.trip_spot_id).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO trip_expenses (
                trip_id, trip_spot_id, user_id, category, description, amount, currency,
                date, payment_method, receipt_image
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trip_id)
        .bind(fields.trip_spot_id)
        .bind(owner)
        .bind(&fields.category)
        .bind(&fields.description)
        .bind(fields.amount)
        .bind(&fields.currency)
        .bind(fields.date)
        .bind(&fields.payment_method)
        .bind(&fields.receipt_image)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        info!("Recorded expense {} for trip {}", id, trip_id);

        self.get(owner, id).await
    }

    /// Returns the file URL a new upload displaced.
    pub async fn update(&self, owner: i64, id: i64, fields: ExpenseFields) -> Result<Option<String>, DatabaseError> {
        let mut tx = begin_write(&self.pool).await?;

        let current: Expense =
            sqlx::query_as("SELECT * FROM trip_expenses WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(owner)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(DatabaseError::NotFound("Expense"))?;
        ensure_spot_in_trip(&mut tx, owner, current.trip_id, fields.trip_spot_id).await?;

        sqlx::query(
            r#"
            UPDATE trip_expenses
            SET trip_spot_id = ?, category = ?, description = ?, amount = ?, currency = ?,
                date = ?, payment_method = ?, receipt_image = COALESCE(?, receipt_image),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(fields.trip_spot_id)
        .bind(&fields.category)
        .bind(&fields.description)
        .bind(fields.amount)
        .bind(&fields.currency)
        .bind(fields.date)
        .bind(&fields.payment_method)
        .bind(&fields.receipt_image)
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(replaced_file(current.receipt_image, &fields.receipt_image))
    }

    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM trip_expenses WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Expense"));
        }
        Ok(())
    }

    async fn currency_totals(&self, owner: i64, trip_id: i64) -> Result<Vec<CurrencyTotal>, sqlx::Error> {
        sqlx::query_as::<_, CurrencyTotal>(
            r#"
            SELECT currency, SUM(amount) AS grand_total, COUNT(*) AS count
            FROM trip_expenses
            WHERE trip_id = ? AND user_id = ?
            GROUP BY currency
            ORDER BY currency
            "#,
        )
        .bind(trip_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await
    }

    /// Totals per category and currency, plus per-currency grand totals.
    /// Amounts in different currencies are never added together.
    pub async fn category_summary(&self, owner: i64, trip_id: i64) -> Result<ExpenseSummary, DatabaseError> {
        let by_category = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT category, currency, COUNT(*) AS count,
                   SUM(amount) AS total_amount, AVG(amount) AS avg_amount
            FROM trip_expenses
            WHERE trip_id = ? AND user_id = ?
            GROUP BY category, currency
            ORDER BY total_amount DESC, category
            "#,
        )
        .bind(trip_id)
        .bind(owner)
        .fetch_all(&self.pool);

        let (by_category, totals) =
            tokio::try_join!(by_category, self.currency_totals(owner, trip_id))?;
        Ok(ExpenseSummary { by_category, totals })
    }

    pub async fn daily(&self, owner: i64, trip_id: i64) -> Result<Vec<DailyExpense>, DatabaseError> {
        let rows = sqlx::query_as::<_, DailyExpense>(
            r#"
            SELECT date, currency, COUNT(*) AS count, SUM(amount) AS total_amount
            FROM trip_expenses
            WHERE trip_id = ? AND user_id = ?
            GROUP BY date, currency
            ORDER BY date, currency
            "#,
        )
        .bind(trip_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Budget against spending in the budget currency; other currencies are
    /// reported separately.
    pub async fn budget_comparison(&self, owner: i64, trip_id: i64) -> Result<BudgetComparison, DatabaseError> {
        let budget: f64 = sqlx::query_scalar("SELECT budget FROM trips WHERE id = ? AND user_id = ?")
            .bind(trip_id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound("Trip"))?;

        let totals = self.currency_totals(owner, trip_id).await?;
        let (spent, others): (Vec<_>, Vec<_>) = totals
            .into_iter()
            .partition(|total| total.currency == BUDGET_CURRENCY);
        let spent = spent.into_iter().next().unwrap_or(CurrencyTotal {
            currency: BUDGET_CURRENCY.to_string(),
            grand_total: 0.0,
            count: 0,
        });

        Ok(BudgetComparison::compute(budget, &spent, others))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repositories::TripRepository;
    use crate::testing::{date, expense_fields, kyoto_trip, seed_user, test_pool};

    async fn setup() -> (SqlitePool, tempfile::TempDir, i64, i64) {
        let (pool, dir) = test_pool().await;
        let owner = seed_user(&pool, "alice").await;
        let trip = TripRepository::new(pool.clone()).create(owner, kyoto_trip()).await.unwrap();
        (pool, dir, owner, trip.id)
    }

    #[tokio::test]
    async fn budget_comparison_counts_budget_currency_only() {
        let (pool, _dir, owner, trip_id) = setup().await;
        let repo = ExpenseRepository::new(pool);

        repo.create(owner, NewExpense { trip_id, fields: expense_fields("food", 5000.0, "JPY") })
            .await
            .unwrap();
        repo.create(owner, NewExpense { trip_id, fields: expense_fields("food", 20.0, "USD") })
            .await
            .unwrap();

        let cmp = repo.budget_comparison(owner, trip_id).await.unwrap();
        assert_eq!(cmp.budget, 30000.0);
        assert_eq!(cmp.total_spent, 5000.0);
        assert_eq!(cmp.remaining, 25000.0);
        assert_eq!(cmp.spent_percentage, 16.67);
        assert_eq!(cmp.expense_count, 1);
        assert!(!cmp.over_budget);
        assert_eq!(cmp.other_currencies.len(), 1);
        assert_eq!(cmp.other_currencies[0].currency, "USD");
        assert_eq!(cmp.other_currencies[0].grand_total, 20.0);
    }

    #[tokio::test]
    async fn budget_comparison_without_expenses() {
        let (pool, _dir, owner, trip_id) = setup().await;
        let repo = ExpenseRepository::new(pool);
        let cmp = repo.budget_comparison(owner, trip_id).await.unwrap();
        assert_eq!(cmp.total_spent, 0.0);
        assert_eq!(cmp.expense_count, 0);
        assert_eq!(cmp.remaining, 30000.0);
    }

    #[tokio::test]
    async fn summary_groups_by_category_and_currency() {
        let (pool, _dir, owner, trip_id) = setup().await;
        let repo = ExpenseRepository::new(pool);

        for (category, amount, currency) in [
            ("food", 1000.0, "JPY"),
            ("food", 3000.0, "JPY"),
            ("transport", 500.0, "JPY"),
            ("food", 12.0, "USD"),
        ] {
            repo.create(owner, NewExpense { trip_id, fields: expense_fields(category, amount, currency) })
                .await
                .unwrap();
        }

        let summary = repo.category_summary(owner, trip_id).await.unwrap();
        assert_eq!(summary.by_category.len(), 3);
        let food_jpy = &summary.by_category[0];
        assert_eq!((food_jpy.category.as_str(), food_jpy.currency.as_str()), ("food", "JPY"));
        assert_eq!(food_jpy.count, 2);
        assert_eq!(food_jpy.total_amount, 4000.0);
        assert_eq!(food_jpy.avg_amount, 2000.0);

        let totals: Vec<_> = summary
            .totals
            .iter()
            .map(|t| (t.currency.as_str(), t.grand_total))
            .collect();
        assert_eq!(totals, [("JPY", 4500.0), ("USD", 12.0)]);
    }

    #[tokio::test]
    async fn daily_rollup_groups_dates() {
        let (pool, _dir, owner, trip_id) = setup().await;
        let repo = ExpenseRepository::new(pool);

        let mut second_day = expense_fields("food", 700.0, "JPY");
        second_day.date = date("2024-04-02");
        repo.create(owner, NewExpense { trip_id, fields: expense_fields("food", 300.0, "JPY") }).await.unwrap();
        repo.create(owner, NewExpense { trip_id, fields: expense_fields("food", 200.0, "JPY") }).await.unwrap();
        repo.create(owner, NewExpense { trip_id, fields: second_day }).await.unwrap();

        let daily = repo.daily(owner, trip_id).await.unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, date("2024-04-01"));
        assert_eq!(daily[0].count, 2);
        assert_eq!(daily[0].total_amount, 500.0);
        assert_eq!(daily[1].total_amount, 700.0);
    }

    #[tokio::test]
    async fn unowned_trip_is_not_found() {
        let (pool, _dir, owner, trip_id) = setup().await;
        let bob = seed_user(&pool, "bob").await;
        let repo = ExpenseRepository::new(pool);
        let expense = repo
            .create(owner, NewExpense { trip_id, fields: expense_fields("food", 100.0, "JPY") })
            .await
            .unwrap();

        assert!(matches!(repo.budget_comparison(bob, trip_id).await, Err(DatabaseError::NotFound("Trip"))));
        assert!(matches!(
            repo.create(bob, NewExpense { trip_id, fields: expense_fields("food", 1.0, "JPY") }).await,
            Err(DatabaseError::NotFound("Trip"))
        ));
        assert!(matches!(repo.get(bob, expense.expense.id).await, Err(DatabaseError::NotFound(_))));
        assert!(repo.category_summary(bob, trip_id).await.unwrap().by_category.is_empty());
    }

    #[tokio::test]
    async fn spot_delete_clears_link() {
        use crate::database::models::NewSpot;
        use crate::database::repositories::SpotRepository;
        use crate::testing::spot_fields;

        let (pool, _dir, owner, trip_id) = setup().await;
        let spots = SpotRepository::new(pool.clone());
        let spot = spots.create(owner, NewSpot { trip_id, fields: spot_fields("a", None) }).await.unwrap();

        let repo = ExpenseRepository::new(pool);
        let mut fields = expense_fields("tickets", 400.0, "JPY");
        fields.trip_spot_id = Some(spot.spot.id);
        let expense = repo.create(owner, NewExpense { trip_id, fields }).await.unwrap();
        assert_eq!(expense.spot_name.as_deref(), Some("a"));

        spots.delete(owner, spot.spot.id).await.unwrap();
        let after = repo.get(owner, expense.expense.id).await.unwrap();
        assert_eq!(after.expense.trip_spot_id, None);
        assert_eq!(after.spot_name, None);
    }
}
