use chrono::NaiveDate;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Memory {
    pub id: i64,
    pub trip_id: i64,
    pub trip_spot_id: Option<i64>,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub media_url: Option<String>,
    pub emotion: String,
    pub weather: String,
    pub date: NaiveDate,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemoryView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub memory: Memory,
    pub spot_name: Option<String>,
    pub spot_category: Option<String>,
    pub trip_title: String,
}

#[derive(Debug, Clone)]
pub struct MemoryFields {
    pub trip_spot_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub emotion: String,
    pub weather: String,
    pub date: NaiveDate,
    /// `None` keeps the stored media on update
    pub media_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMemory {
    pub trip_id: i64,
    pub fields: MemoryFields,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFilter {
    pub trip_id: Option<i64>,
    pub spot_id: Option<i64>,
    pub emotion: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyMemories {
    pub date: NaiveDate,
    pub memory_count: i64,
    pub titles: Json<Vec<String>>,
    pub emotions: Json<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EmotionCount {
    pub emotion: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeatherCount {
    pub weather: String,
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemoryStats {
    pub total_memories: i64,
    pub memories_with_media: i64,
    pub active_days: i64,
    pub spots_with_memories: i64,
}
