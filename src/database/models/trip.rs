use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::{TripDay, SpotView};

/// Longest trip accepted, in calendar days
pub const MAX_TRIP_DAYS: i64 = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TripStatus {
    Planning,
    Ongoing,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub const ALL: [TripStatus; 4] = [
        TripStatus::Planning,
        TripStatus::Ongoing,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Planning => "planning",
            TripStatus::Ongoing => "ongoing",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TripStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "must be one of: {}",
                    TripStatus::ALL.map(|s| s.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Trip {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    pub budget: f64,
    pub status: TripStatus,
    pub cover_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Trip row with per-trip counters for list views
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TripSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub trip: Trip,
    pub day_count: i64,
    pub spot_count: i64,
    /// Sum of expenses in the budget currency
    pub total_expense: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripDetail {
    pub trip: Trip,
    pub days: Vec<TripDay>,
    pub spots: Vec<SpotView>,
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    pub budget: f64,
    pub cover_image: Option<String>,
}

/// Full replacement of the editable trip fields. `status` and `cover_image`
/// keep their stored values when `None`.
#[derive(Debug, Clone)]
pub struct TripChanges {
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    pub budget: f64,
    pub status: Option<TripStatus>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    pub status: Option<TripStatus>,
}

/// Check a date range and return the number of calendar days it covers.
pub fn trip_length(start: NaiveDate, end: NaiveDate) -> Result<i64, String> {
    if end < start {
        return Err("end_date must not be before start_date".to_string());
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_TRIP_DAYS {
        return Err(format!("a trip may span at most {} days", MAX_TRIP_DAYS));
    }
    Ok(days)
}

/// One `(date, "Day N")` entry per calendar day of the range, inclusive.
pub fn day_plan(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, String)> {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .enumerate()
        .map(|(offset, date)| (date, format!("Day {}", offset + 1)))
        .collect()
}
