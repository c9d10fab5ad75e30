use super::FromFields;
use crate::api::form::{FieldCheck, Fields};
use crate::database::models::{NewTripDay, TripDayChanges};
use crate::error::ApiError;

impl FromFields for NewTripDay {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let date = check.required_date("date");
        let title = check.required_text("title");
        let description = check.text_or_empty("description");
        check.finish()?;

        Ok(NewTripDay {
            date,
            title,
            description,
        })
    }
}

impl FromFields for TripDayChanges {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let changes = TripDayChanges {
            date: check.date("date"),
            title: check.text("title"),
            description: check.raw("description").map(|_| check.text_or_empty("description")),
        };
        check.finish()?;
        Ok(changes)
    }
}
