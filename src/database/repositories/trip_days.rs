use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTripDay, Trip, TripDay, TripDayChanges};

/// Days are owned through their parent trip
#[derive(Clone)]
pub struct TripDayRepository {
    pool: SqlitePool,
}

const OWNED_DAY: &str = r#"
    SELECT d.* FROM trip_days d
    JOIN trips t ON t.id = d.trip_id
    WHERE d.id = ? AND t.user_id = ?
"#;

fn check_in_range(trip: &Trip, date: NaiveDate) -> Result<(), DatabaseError> {
    if date < trip.start_date || date > trip.end_date {
        return Err(DatabaseError::Invalid(format!(
            "date must fall between {} and {}",
            trip.start_date, trip.end_date
        )));
    }
    Ok(())
}

impl TripDayRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn owned_trip(&self, owner: i64, trip_id: i64) -> Result<Trip, DatabaseError> {
        sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = ? AND user_id = ?")
            .bind(trip_id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound("Trip"))
    }

    /// Days of an owned trip by date. Unowned trips yield an empty list.
    pub async fn list(&self, owner: i64, trip_id: i64) -> Result<Vec<TripDay>, DatabaseError> {
        let days = sqlx::query_as::<_, TripDay>(
            r#"
            SELECT d.* FROM trip_days d
            JOIN trips t ON t.id = d.trip_id
            WHERE d.trip_id = ? AND t.user_id = ?
            ORDER BY d.date, d.id
            "#,
        )
        .bind(trip_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(days)
    }

    pub async fn get(&self, owner: i64, id: i64) -> Result<TripDay, DatabaseError> {
        sqlx::query_as::<_, TripDay>(OWNED_DAY)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound("Trip day"))
    }

    pub async fn create(&self, owner: i64, trip_id: i64, input: NewTripDay) -> Result<TripDay, DatabaseError> {
        let trip = self.owned_trip(owner, trip_id).await?;
        check_in_range(&trip, input.date)?;

        let id = sqlx::query("INSERT INTO trip_days (trip_id, date, title, description) VALUES (?, ?, ?, ?)")
            .bind(trip_id)
            .bind(input.date)
            .bind(&input.title)
            .bind(&input.description)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!("Added day {} to trip {}", id, trip_id);
        self.get(owner, id).await
    }

    pub async fn update(&self, owner: i64, id: i64, changes: TripDayChanges) -> Result<(), DatabaseError> {
        let day = self.get(owner, id).await?;
        if let Some(date) = changes.date {
            let trip = self.owned_trip(owner, day.trip_id).await?;
            check_in_range(&trip, date)?;
        }

        let result = sqlx::query(
            r#"
            UPDATE trip_days
            SET date = COALESCE(?, date), title = COALESCE(?, title),
                description = COALESCE(?, description)
            WHERE id = ? AND trip_id IN (SELECT id FROM trips WHERE user_id = ?)
            "#,
        )
        .bind(changes.date)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Trip day"));
        }
        Ok(())
    }

    /// Removes the day together with the spots scheduled on it
    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM trip_days WHERE id = ? AND trip_id IN (SELECT id FROM trips WHERE user_id = ?)",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Trip day"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repositories::TripRepository;
    use crate::testing::{date, kyoto_trip, seed_user, test_pool};

    #[tokio::test]
    async fn lists_generated_days_for_owner_only() {
        let (pool, _dir) = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let trip = TripRepository::new(pool.clone()).create(alice, kyoto_trip()).await.unwrap();
        let repo = TripDayRepository::new(pool);

        assert_eq!(repo.list(alice, trip.id).await.unwrap().len(), 3);
        assert!(repo.list(bob, trip.id).await.unwrap().is_empty());

        let day = &repo.list(alice, trip.id).await.unwrap()[0];
        assert!(matches!(repo.get(bob, day.id).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(repo.delete(bob, day.id).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn create_and_update_stay_inside_trip_range() {
        let (pool, _dir) = test_pool().await;
        let owner = seed_user(&pool, "alice").await;
        let trip = TripRepository::new(pool.clone()).create(owner, kyoto_trip()).await.unwrap();
        let repo = TripDayRepository::new(pool);

        let outside = NewTripDay {
            date: date("2024-04-10"),
            title: "Extra".into(),
            description: String::new(),
        };
        assert!(matches!(repo.create(owner, trip.id, outside).await, Err(DatabaseError::Invalid(_))));

        let extra = repo
            .create(
                owner,
                trip.id,
                NewTripDay {
                    date: date("2024-04-02"),
                    title: "Side trip".into(),
                    description: "Nara".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(extra.title, "Side trip");

        let moved = TripDayChanges {
            date: Some(date("2024-05-01")),
            ..Default::default()
        };
        assert!(matches!(repo.update(owner, extra.id, moved).await, Err(DatabaseError::Invalid(_))));

        let renamed = TripDayChanges {
            title: Some("Nara day".into()),
            ..Default::default()
        };
        repo.update(owner, extra.id, renamed).await.unwrap();
        let fetched = repo.get(owner, extra.id).await.unwrap();
        assert_eq!(fetched.title, "Nara day");
        assert_eq!(fetched.description, "Nara");
        assert_eq!(fetched.date, date("2024-04-02"));
    }
}
