use serde_json::Value;

use super::FromFields;
use crate::api::form::{FieldCheck, Fields};
use crate::database::models::{trip_length, NewTrip, TripChanges, TripFilter, TripStatus};
use crate::error::ApiError;

/// Fields shared by trip create and update
struct TripBody {
    title: String,
    destination: String,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
    description: String,
    budget: f64,
}

fn trip_body(check: &mut FieldCheck<'_>) -> TripBody {
    let title = check.required_text("title");
    let destination = check.required_text("destination");
    let start_date = check.date("start_date");
    let end_date = check.date("end_date");
    let description = check.text_or_empty("description");
    let budget = check.number("budget").unwrap_or(0.0);

    if start_date.is_none() {
        check.reject("start_date", "is required");
    }
    if end_date.is_none() {
        check.reject("end_date", "is required");
    }
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if let Err(problem) = trip_length(start, end) {
            check.reject("end_date", problem);
        }
    }
    if budget < 0.0 {
        check.reject("budget", "must not be negative");
    }

    TripBody {
        title,
        destination,
        start_date: start_date.unwrap_or_default(),
        end_date: end_date.unwrap_or_default(),
        description,
        budget,
    }
}

impl FromFields for NewTrip {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let body = trip_body(&mut check);
        check.finish()?;

        Ok(NewTrip {
            title: body.title,
            destination: body.destination,
            start_date: body.start_date,
            end_date: body.end_date,
            description: body.description,
            budget: body.budget,
            cover_image: None,
        })
    }
}

impl FromFields for TripChanges {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let body = trip_body(&mut check);
        let status = match check.text("status") {
            Some(raw) => match raw.parse::<TripStatus>() {
                Ok(status) => Some(status),
                Err(problem) => {
                    check.reject("status", problem);
                    None
                }
            },
            None => None,
        };
        check.finish()?;

        Ok(TripChanges {
            title: body.title,
            destination: body.destination,
            start_date: body.start_date,
            end_date: body.end_date,
            description: body.description,
            budget: body.budget,
            status,
            cover_image: None,
        })
    }
}

/// Body of `PATCH /api/trips/:id/status`
#[derive(Debug, Clone, Copy)]
pub struct StatusPatch(pub TripStatus);

impl FromFields for StatusPatch {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        match fields.get("status") {
            Some(Value::String(raw)) => raw
                .parse::<TripStatus>()
                .map(StatusPatch)
                .map_err(|problem| ApiError::field_error("status", problem)),
            Some(_) => Err(ApiError::field_error("status", "must be a string")),
            None => Err(ApiError::field_error("status", "is required")),
        }
    }
}

impl FromFields for TripFilter {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let status = check.text("status");
        let status = match status.map(|raw| raw.parse::<TripStatus>()) {
            Some(Ok(status)) => Some(status),
            Some(Err(problem)) => {
                check.reject("status", problem);
                None
            }
            None => None,
        };
        check.finish()?;
        Ok(TripFilter { status })
    }
}
