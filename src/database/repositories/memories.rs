use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::database::manager::{begin_write, DatabaseError};
use crate::database::models::{
    DailyMemories, EmotionCount, Memory, MemoryFields, MemoryFilter, MemoryStats, MemoryView,
    NewMemory, WeatherCount,
};

use super::{ensure_spot_in_trip, ensure_trip_owned, replaced_file};

const MEMORY_VIEW: &str = r#"
    SELECT m.*, s.name AS spot_name, s.category AS spot_category, t.title AS trip_title
    FROM trip_memories m
    JOIN trips t ON t.id = m.trip_id
    LEFT JOIN trip_spots s ON s.id = m.trip_spot_id
"#;

#[derive(Clone)]
pub struct MemoryRepository {
    pool: SqlitePool,
}

impl MemoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner: i64, filter: &MemoryFilter) -> Result<Vec<MemoryView>, DatabaseError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(MEMORY_VIEW);
        query.push(" WHERE m.user_id = ");
        query.push_bind(owner);

        if let Some(trip_id) = filter.trip_id {
            query.push(" AND m.trip_id = ");
            query.push_bind(trip_id);
        }
        if let Some(spot_id) = filter.spot_id {
            query.push(" AND m.trip_spot_id = ");
            query.push_bind(spot_id);
        }
        if let Some(emotion) = &filter.emotion {
            query.push(" AND m.emotion = ");
            query.push_bind(emotion.clone());
        }
        query.push(" ORDER BY m.date DESC, m.created_at DESC, m.id DESC");

        let memories = query.build_query_as::<MemoryView>().fetch_all(&self.pool).await?;
        Ok(memories)
    }

    pub async fn get(&self, owner: i64, id: i64) -> Result<MemoryView, DatabaseError> {
        let sql = format!("{} WHERE m.id = ? AND m.user_id = ?", MEMORY_VIEW);
        sqlx::query_as::<_, MemoryView>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound("Memory"))
    }

    pub async fn create(&self, owner: i64, input: NewMemory) -> Result<MemoryView, DatabaseError> {
        let NewMemory { trip_id, fields } = input;
        let mut tx = begin_write(&self.pool).await?;

        ensure_trip_owned(&mut tx, owner, trip_id).await?;
        ensure_spot_in_trip(&mut tx, owner, trip_id, fields.trip_spot_id).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO trip_memories (
                trip_id, trip_spot_id, user_id, title, content, media_url, emotion, weather, date
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trip_id)
        .bind(fields.trip_spot_id)
        .bind(owner)
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(&fields.media_url)
        .bind(&fields.emotion)
        .bind(&fields.weather)
        .bind(fields.date)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        info!("Recorded memory {} for trip {}", id, trip_id);

        self.get(owner, id).await
    }

    /// Returns the file URL a new upload displaced.
    pub async fn update(&self, owner: i64, id: i64, fields: MemoryFields) -> Result<Option<String>, DatabaseError> {
        let mut tx = begin_write(&self.pool).await?;

        let current: Memory = sqlx::query_as("SELECT * FROM trip_memories WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DatabaseError::NotFound("Memory"))?;
        ensure_spot_in_trip(&mut tx, owner, current.trip_id, fields.trip_spot_id).await?;

        sqlx::query(
            r#"
            UPDATE trip_memories
            SET trip_spot_id = ?, title = ?, content = ?, media_url = COALESCE(?, media_url),
                emotion = ?, weather = ?, date = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(fields.trip_spot_id)
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(&fields.media_url)
        .bind(&fields.emotion)
        .bind(&fields.weather)
        .bind(fields.date)
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(replaced_file(current.media_url, &fields.media_url))
    }

    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM trip_memories WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Memory"));
        }
        Ok(())
    }

    /// Memories attached to one spot, newest first
    pub async fn by_spot(&self, owner: i64, spot_id: i64) -> Result<Vec<MemoryView>, DatabaseError> {
        self.list(
            owner,
            &MemoryFilter {
                spot_id: Some(spot_id),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn daily(&self, owner: i64, trip_id: i64) -> Result<Vec<DailyMemories>, DatabaseError> {
        let rows = sqlx::query_as::<_, DailyMemories>(
            r#"
            SELECT date,
                   COUNT(*) AS memory_count,
                   json_group_array(title) AS titles,
                   json_group_array(emotion) FILTER (WHERE emotion != '') AS emotions
            FROM trip_memories
            WHERE trip_id = ? AND user_id = ?
            GROUP BY date
            ORDER BY date
            "#,
        )
        .bind(trip_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn emotions(&self, owner: i64, trip_id: i64) -> Result<Vec<EmotionCount>, DatabaseError> {
        let rows = sqlx::query_as::<_, EmotionCount>(
            r#"
            SELECT emotion, COUNT(*) AS count
            FROM trip_memories
            WHERE trip_id = ? AND user_id = ? AND emotion != ''
            GROUP BY emotion
            ORDER BY count DESC, emotion
            "#,
        )
        .bind(trip_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn weather(&self, owner: i64, trip_id: i64) -> Result<Vec<WeatherCount>, DatabaseError> {
        let rows = sqlx::query_as::<_, WeatherCount>(
            r#"
            SELECT weather, date, COUNT(*) AS count
            FROM trip_memories
            WHERE trip_id = ? AND user_id = ? AND weather != ''
            GROUP BY weather, date
            ORDER BY date, weather
            "#,
        )
        .bind(trip_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn stats(&self, owner: i64, trip_id: i64) -> Result<MemoryStats, DatabaseError> {
        let stats = sqlx::query_as::<_, MemoryStats>(
            r#"
            SELECT COUNT(*) AS total_memories,
                   COUNT(media_url) AS memories_with_media,
                   COUNT(DISTINCT date) AS active_days,
                   COUNT(DISTINCT trip_spot_id) AS spots_with_memories
            FROM trip_memories
            WHERE trip_id = ? AND user_id = ?
            "#,
        )
        .bind(trip_id)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
