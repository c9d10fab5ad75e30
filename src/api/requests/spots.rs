use chrono::NaiveTime;
use serde_json::Value;

use super::FromFields;
use crate::api::form::{FieldCheck, Fields};
use crate::database::models::{
    NewSpot, SpotFields, SpotFilter, DEFAULT_DURATION_MINUTES, MAX_RATING,
};
use crate::error::ApiError;

fn parse_visit_time(raw: &str) -> Option<String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
        .map(|time| time.format("%H:%M").to_string())
}

fn in_range(check: &mut FieldCheck<'_>, name: &str, value: Option<f64>, limit: f64) -> Option<f64> {
    match value {
        Some(v) if !(-limit..=limit).contains(&v) => {
            check.reject(name, format!("must be between {} and {}", -limit, limit));
            None
        }
        other => other,
    }
}

fn spot_fields(check: &mut FieldCheck<'_>) -> SpotFields {
    let trip_day_id = check.integer("trip_day_id");
    let name = check.required_text("name");
    let category = check.text_or_empty("category");

    let lat = check.number("lat");
    let lat = in_range(check, "lat", lat, 90.0);
    let lng = check.number("lng");
    let lng = in_range(check, "lng", lng, 180.0);

    let visit_time = match check.text("visit_time") {
        Some(raw) => {
            let parsed = parse_visit_time(&raw);
            if parsed.is_none() {
                check.reject("visit_time", "must be a time in HH:MM format");
            }
            parsed
        }
        None => None,
    };

    let duration = check.integer("duration").unwrap_or(DEFAULT_DURATION_MINUTES);
    if duration <= 0 {
        check.reject("duration", "must be greater than 0");
    }
    let cost = check.number("cost").unwrap_or(0.0);
    if cost < 0.0 {
        check.reject("cost", "must not be negative");
    }
    let rating = check.integer("rating").unwrap_or(0);
    if !(0..=MAX_RATING).contains(&rating) {
        check.reject("rating", format!("must be between 0 and {}", MAX_RATING));
    }

    SpotFields {
        trip_day_id,
        name,
        category,
        lat,
        lng,
        address: check.text_or_empty("address"),
        description: check.text_or_empty("description"),
        visit_time,
        duration,
        cost,
        notes: check.text_or_empty("notes"),
        rating,
        image_url: None,
    }
}

impl FromFields for SpotFields {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let spot = spot_fields(&mut check);
        check.finish()?;
        Ok(spot)
    }
}

impl FromFields for NewSpot {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let trip_id = check.required_integer("trip_id");
        let spot = spot_fields(&mut check);
        check.finish()?;
        Ok(NewSpot { trip_id, fields: spot })
    }
}

/// Body of `PATCH /api/trip-spots/:id/visited`
#[derive(Debug, Clone, Copy)]
pub struct VisitedPatch(pub bool);

impl FromFields for VisitedPatch {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        match fields.get("visited") {
            Some(Value::Bool(visited)) => Ok(VisitedPatch(*visited)),
            Some(_) => Err(ApiError::field_error("visited", "must be a boolean")),
            None => Err(ApiError::field_error("visited", "is required")),
        }
    }
}

/// Body of `PATCH /api/trip-spots/:id/order`
#[derive(Debug, Clone, Copy)]
pub struct OrderPatch(pub i64);

impl FromFields for OrderPatch {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        match fields.get("order_index") {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|index| i64::try_from(index).ok())
                .map(OrderPatch)
                .ok_or_else(|| ApiError::field_error("order_index", "must be a non-negative integer")),
            Some(_) => Err(ApiError::field_error("order_index", "must be a non-negative integer")),
            None => Err(ApiError::field_error("order_index", "is required")),
        }
    }
}

impl FromFields for SpotFilter {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let filter = SpotFilter {
            trip_id: check.integer("trip_id"),
            day_id: check.integer("day_id"),
            visited: check.boolean("visited"),
        };
        check.finish()?;
        Ok(filter)
    }
}
