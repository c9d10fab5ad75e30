use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::database::manager::{begin_write, DatabaseError};
use crate::database::models::{NewSpot, SpotFields, SpotFilter, SpotView, TripSpot};

use super::{ensure_trip_owned, replaced_file};

/// Spot rows joined with their day and trip labels
pub(crate) const SPOT_VIEW: &str = r#"
    SELECT s.*, d.title AS day_title, d.date AS day_date, t.title AS trip_title
    FROM trip_spots s
    JOIN trips t ON t.id = s.trip_id
    LEFT JOIN trip_days d ON d.id = s.trip_day_id
"#;

#[derive(Clone)]
pub struct SpotRepository {
    pool: SqlitePool,
}

/// A spot's ordering scope is its day, or the trip's unscheduled spots when it has none.
async fn next_order_index(
    conn: &mut SqliteConnection,
    trip_id: i64,
    day_id: Option<i64>,
) -> Result<i64, DatabaseError> {
    let next: i64 = match day_id {
        Some(day_id) => {
            sqlx::query_scalar(
                "SELECT COALESCE(MAX(order_index), -1) + 1 FROM trip_spots WHERE trip_day_id = ?",
            )
            .bind(day_id)
            .fetch_one(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_scalar(
                "SELECT COALESCE(MAX(order_index), -1) + 1 FROM trip_spots \
                 WHERE trip_id = ? AND trip_day_id IS NULL",
            )
            .bind(trip_id)
            .fetch_one(&mut *conn)
            .await?
        }
    };
    Ok(next)
}

async fn scope_ids(
    conn: &mut SqliteConnection,
    trip_id: i64,
    day_id: Option<i64>,
) -> Result<Vec<i64>, DatabaseError> {
    let ids: Vec<i64> = match day_id {
        Some(day_id) => {
            sqlx::query_scalar(
                "SELECT id FROM trip_spots WHERE trip_day_id = ? ORDER BY order_index, id",
            )
            .bind(day_id)
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_scalar(
                "SELECT id FROM trip_spots WHERE trip_id = ? AND trip_day_id IS NULL \
                 ORDER BY order_index, id",
            )
            .bind(trip_id)
            .fetch_all(&mut *conn)
            .await?
        }
    };
    Ok(ids)
}

async fn ensure_day_in_trip(
    conn: &mut SqliteConnection,
    trip_id: i64,
    day_id: Option<i64>,
) -> Result<(), DatabaseError> {
    let Some(day_id) = day_id else {
        return Ok(());
    };
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM trip_days WHERE id = ? AND trip_id = ?")
        .bind(day_id)
        .bind(trip_id)
        .fetch_optional(&mut *conn)
        .await?;
    found.map(|_| ()).ok_or(DatabaseError::NotFound("Trip day"))
}

async fn owned_spot(conn: &mut SqliteConnection, owner: i64, id: i64) -> Result<TripSpot, DatabaseError> {
    sqlx::query_as::<_, TripSpot>("SELECT * FROM trip_spots WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(DatabaseError::NotFound("Spot"))
}

impl SpotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner: i64, filter: &SpotFilter) -> Result<Vec<SpotView>, DatabaseError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SPOT_VIEW);
        query.push(" WHERE s.user_id = ");
        query.push_bind(owner);

        if let Some(trip_id) = filter.trip_id {
            query.push(" AND s.trip_id = ");
            query.push_bind(trip_id);
        }
        if let Some(day_id) = filter.day_id {
            query.push(" AND s.trip_day_id = ");
            query.push_bind(day_id);
        }
        if let Some(visited) = filter.visited {
            query.push(" AND s.visited = ");
            query.push_bind(visited);
        }
        query.push(" ORDER BY d.date, s.order_index, s.visit_time, s.id");

        let spots = query.build_query_as::<SpotView>().fetch_all(&self.pool).await?;
        Ok(spots)
    }

    /// Spots scheduled on one day, in itinerary order
    pub async fn list_by_day(&self, owner: i64, day_id: i64) -> Result<Vec<SpotView>, DatabaseError> {
        let sql = format!(
            "{} WHERE s.trip_day_id = ? AND s.user_id = ? ORDER BY s.order_index, s.visit_time, s.id",
            SPOT_VIEW
        );
        let spots = sqlx::query_as::<_, SpotView>(&sql)
            .bind(day_id)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(spots)
    }

    pub async fn get(&self, owner: i64, id: i64) -> Result<SpotView, DatabaseError> {
        let sql = format!("{} WHERE s.id = ? AND s.user_id = ?", SPOT_VIEW);
        sqlx::query_as::<_, SpotView>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound("Spot"))
    }

    /// Append a spot to the end of its day (or the trip's unscheduled list).
    pub async fn create(&self, owner: i64, input: NewSpot) -> Result<SpotView, DatabaseError> {
        let NewSpot { trip_id, fields } = input;
        let mut tx = begin_write(&self.pool).await?;

        ensure_trip_owned(&mut tx, owner, trip_id).await?;
        ensure_day_in_trip(&mut tx, trip_id, fields.trip_day_id).await?;
        let order_index = next_order_index(&mut tx, trip_id, fields.trip_day_id).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO trip_spots (
                trip_id, trip_day_id, user_id, name, category, lat, lng, address, description,
                image_url, visit_time, duration, cost, notes, rating, order_index
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trip_id)
        .bind(fields.trip_day_id)
        .bind(owner)
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.lat)
        .bind(fields.lng)
        .bind(&fields.address)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .bind(&fields.visit_time)
        .bind(fields.duration)
        .bind(fields.cost)
        .bind(&fields.notes)
        .bind(fields.rating)
        .bind(order_index)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        info!("Created spot {} in trip {} at position {}", id, trip_id, order_index);

        self.get(owner, id).await
    }

    /// Replace the editable fields. Moving to another day appends the spot
    /// to the end of that day. Returns the image URL a new upload displaced.
    pub async fn update(&self, owner: i64, id: i64, fields: SpotFields) -> Result<Option<String>, DatabaseError> {
        let mut tx = begin_write(&self.pool).await?;

        let current = owned_spot(&mut tx, owner, id).await?;
        let order_index = if current.trip_day_id == fields.trip_day_id {
            current.order_index
        } else {
            ensure_day_in_trip(&mut tx, current.trip_id, fields.trip_day_id).await?;
            next_order_index(&mut tx, current.trip_id, fields.trip_day_id).await?
        };

        sqlx::query(
            r#"
            UPDATE trip_spots
            SET trip_day_id = ?, name = ?, category = ?, lat = ?, lng = ?, address = ?,
                description = ?, image_url = COALESCE(?, image_url), visit_time = ?, duration = ?,
                cost = ?, notes = ?, rating = ?, order_index = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(fields.trip_day_id)
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.lat)
        .bind(fields.lng)
        .bind(&fields.address)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .bind(&fields.visit_time)
        .bind(fields.duration)
        .bind(fields.cost)
        .bind(&fields.notes)
        .bind(fields.rating)
        .bind(order_index)
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Updated spot {}", id);
        Ok(replaced_file(current.image_url, &fields.image_url))
    }

    pub async fn set_visited(&self, owner: i64, id: i64, visited: bool) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE trip_spots SET visited = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ?",
        )
        .bind(visited)
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Spot"));
        }
        Ok(())
    }

    /// Move a spot to `index` within its scope and renumber the scope `0..n`.
    /// Indices past the end are clamped; the final index is returned.
    pub async fn reorder(&self, owner: i64, id: i64, index: i64) -> Result<i64, DatabaseError> {
        let mut tx = begin_write(&self.pool).await?;

        let spot = owned_spot(&mut tx, owner, id).await?;
        let mut ids = scope_ids(&mut tx, spot.trip_id, spot.trip_day_id).await?;
        ids.retain(|other| *other != id);

        let target = index.clamp(0, ids.len() as i64) as usize;
        ids.insert(target, id);

        for (position, spot_id) in ids.iter().enumerate() {
            sqlx::query("UPDATE trip_spots SET order_index = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
                .bind(position as i64)
                .bind(spot_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!("Moved spot {} to position {}", id, target);
        Ok(target as i64)
    }

    /// Linked expenses and memories keep their rows with the spot link cleared
    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM trip_spots WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Spot"));
        }
        Ok(())
    }
}
