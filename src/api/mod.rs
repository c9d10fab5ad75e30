pub mod form;
pub mod requests;

pub use form::{FieldCheck, Fields, FormPayload, QueryFields, ResourceId};
pub use requests::FromFields;
