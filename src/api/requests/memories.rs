use super::FromFields;
use crate::api::form::{FieldCheck, Fields};
use crate::database::models::{MemoryFields, MemoryFilter, NewMemory};
use crate::error::ApiError;

fn memory_fields(check: &mut FieldCheck<'_>) -> MemoryFields {
    MemoryFields {
        trip_spot_id: check.integer("trip_spot_id"),
        title: check.required_text("title"),
        content: check.text_or_empty("content"),
        emotion: check.text_or_empty("emotion"),
        weather: check.text_or_empty("weather"),
        date: check.required_date("date"),
        media_url: None,
    }
}

impl FromFields for MemoryFields {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let memory = memory_fields(&mut check);
        check.finish()?;
        Ok(memory)
    }
}

impl FromFields for NewMemory {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let trip_id = check.required_integer("trip_id");
        let memory = memory_fields(&mut check);
        check.finish()?;
        Ok(NewMemory {
            trip_id,
            fields: memory,
        })
    }
}

impl FromFields for MemoryFilter {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let filter = MemoryFilter {
            trip_id: check.integer("trip_id"),
            spot_id: check.integer("spot_id"),
            emotion: check.text("emotion"),
        };
        check.finish()?;
        Ok(filter)
    }
}
