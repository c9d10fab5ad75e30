//! Typed request bodies built from untyped [`Fields`](super::Fields)

pub mod auth;
pub mod expenses;
pub mod memories;
pub mod spots;
pub mod trip_days;
pub mod trips;

use super::form::Fields;
use crate::error::ApiError;

/// Parse and validate one endpoint's input. Problems come back as a 400
/// with per-field messages.
pub trait FromFields: Sized {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError>;
}
