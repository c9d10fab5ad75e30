use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::database::manager::{begin_write, DatabaseError};
use crate::database::models::{
    day_plan, trip_length, NewTrip, SpotView, Trip, TripChanges, TripDay, TripDetail, TripFilter,
    TripStatus, TripSummary, BUDGET_CURRENCY,
};

use super::replaced_file;
use super::spots::SPOT_VIEW;

#[derive(Clone)]
pub struct TripRepository {
    pool: SqlitePool,
}

fn check_trip_fields(
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    budget: f64,
) -> Result<(), DatabaseError> {
    trip_length(start, end).map_err(DatabaseError::Invalid)?;
    if !budget.is_finite() || budget < 0.0 {
        return Err(DatabaseError::Invalid("budget must not be negative".to_string()));
    }
    Ok(())
}

impl TripRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Owner's trips, newest first, with day/spot counts and spending in the budget currency
    pub async fn list(&self, owner: i64, filter: &TripFilter) -> Result<Vec<TripSummary>, DatabaseError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT t.*,
                (SELECT COUNT(*) FROM trip_days d WHERE d.trip_id = t.id) AS day_count,
                (SELECT COUNT(*) FROM trip_spots s WHERE s.trip_id = t.id) AS spot_count,
                (SELECT COALESCE(SUM(e.amount), 0.0) FROM trip_expenses e
                    WHERE e.trip_id = t.id AND e.currency = "#,
        );
        query.push_bind(BUDGET_CURRENCY);
        query.push(") AS total_expense FROM trips t WHERE t.user_id = ");
        query.push_bind(owner);

        if let Some(status) = filter.status {
            query.push(" AND t.status = ");
            query.push_bind(status);
        }
        query.push(" ORDER BY t.created_at DESC, t.id DESC");

        let trips = query
            .build_query_as::<TripSummary>()
            .fetch_all(&self.pool)
            .await?;
        Ok(trips)
    }

    pub async fn get(&self, owner: i64, id: i64) -> Result<Trip, DatabaseError> {
        sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound("Trip"))
    }

    /// Trip with its days and spots. The ownership check runs first; the two
    /// child reads then run concurrently.
    pub async fn detail(&self, owner: i64, id: i64) -> Result<TripDetail, DatabaseError> {
        let trip = self.get(owner, id).await?;

        let days = sqlx::query_as::<_, TripDay>(
            "SELECT * FROM trip_days WHERE trip_id = ? ORDER BY date, id",
        )
        .bind(id)
        .fetch_all(&self.pool);

        let spots_sql = format!(
            "{} WHERE s.trip_id = ? AND s.user_id = ? \
             ORDER BY d.date, s.order_index, s.visit_time, s.id",
            SPOT_VIEW
        );
        let spots = sqlx::query_as::<_, SpotView>(&spots_sql)
            .bind(id)
            .bind(owner)
            .fetch_all(&self.pool);

        let (days, spots) = tokio::try_join!(days, spots)?;
        Ok(TripDetail { trip, days, spots })
    }

    /// Insert the trip and one day per calendar day of its range as one unit.
    pub async fn create(&self, owner: i64, input: NewTrip) -> Result<Trip, DatabaseError> {
        check_trip_fields(input.start_date, input.end_date, input.budget)?;

        let mut tx = begin_write(&self.pool).await?;

        let trip_id = sqlx::query(
            r#"
            INSERT INTO trips (user_id, title, destination, start_date, end_date, description, budget, cover_image)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(owner)
        .bind(&input.title)
        .bind(&input.destination)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.description)
        .bind(input.budget)
        .bind(&input.cover_image)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let plan = day_plan(input.start_date, input.end_date);
        for (date, title) in &plan {
            sqlx::query("INSERT INTO trip_days (trip_id, date, title) VALUES (?, ?, ?)")
                .bind(trip_id)
                .bind(date)
                .bind(title)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!("Created trip {} with {} days for user {}", trip_id, plan.len(), owner);

        self.get(owner, trip_id).await
    }

    /// Replace the editable fields. Days are not regenerated when dates move.
    /// Returns the cover URL a new upload displaced.
    pub async fn update(&self, owner: i64, id: i64, changes: TripChanges) -> Result<Option<String>, DatabaseError> {
        check_trip_fields(changes.start_date, changes.end_date, changes.budget)?;

        let mut tx = begin_write(&self.pool).await?;
        let previous: Option<String> =
            sqlx::query_scalar("SELECT cover_image FROM trips WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(owner)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(DatabaseError::NotFound("Trip"))?;

        sqlx::query(
            r#"
            UPDATE trips
            SET title = ?, destination = ?, start_date = ?, end_date = ?, description = ?,
                budget = ?, status = COALESCE(?, status), cover_image = COALESCE(?, cover_image),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.destination)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(&changes.description)
        .bind(changes.budget)
        .bind(changes.status)
        .bind(&changes.cover_image)
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Updated trip {}", id);
        Ok(replaced_file(previous, &changes.cover_image))
    }

    pub async fn set_status(&self, owner: i64, id: i64, status: TripStatus) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE trips SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ?",
        )
        .bind(status)
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Trip"));
        }
        Ok(())
    }

    /// Removes the trip with its days, spots, expenses and memories
    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM trips WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Trip"));
        }
        info!("Deleted trip {} for user {}", id, owner);
        Ok(())
    }
}
