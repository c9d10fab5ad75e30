use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

pub const DEFAULT_DURATION_MINUTES: i64 = 60;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TripSpot {
    pub id: i64,
    pub trip_id: i64,
    pub trip_day_id: Option<i64>,
    pub user_id: i64,
    pub name: String,
    pub category: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: String,
    pub description: String,
    pub image_url: Option<String>,
    pub visit_time: Option<String>,
    pub duration: i64,
    pub cost: f64,
    pub notes: String,
    pub rating: i64,
    pub visited: bool,
    pub order_index: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Spot joined with its day and trip labels
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SpotView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub spot: TripSpot,
    pub day_title: Option<String>,
    pub day_date: Option<NaiveDate>,
    pub trip_title: String,
}

/// Editable spot fields, already validated and defaulted
#[derive(Debug, Clone)]
pub struct SpotFields {
    pub trip_day_id: Option<i64>,
    pub name: String,
    pub category: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: String,
    pub description: String,
    pub visit_time: Option<String>,
    pub duration: i64,
    pub cost: f64,
    pub notes: String,
    pub rating: i64,
    /// `None` keeps the stored image on update
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSpot {
    pub trip_id: i64,
    pub fields: SpotFields,
}

#[derive(Debug, Clone, Default)]
pub struct SpotFilter {
    pub trip_id: Option<i64>,
    pub day_id: Option<i64>,
    pub visited: Option<bool>,
}
