use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TripDay {
    pub id: i64,
    pub trip_id: i64,
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewTripDay {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
}

/// Fields left as `None` keep their stored values
#[derive(Debug, Clone, Default)]
pub struct TripDayChanges {
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    pub description: Option<String>,
}
