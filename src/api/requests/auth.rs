use serde_json::Value;

use super::FromFields;
use crate::api::form::Fields;
use crate::error::ApiError;

/// Username and password as sent. The password is taken verbatim.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl FromFields for Credentials {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let username = fields.text("username").ok().flatten();
        let password = match fields.get("password") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };

        match (username, password) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            (username, password) => {
                let mut field_errors = crate::error::FieldErrors::new();
                if username.is_none() {
                    field_errors.insert("username".into(), "is required".into());
                }
                if password.is_none() {
                    field_errors.insert("password".into(), "is required".into());
                }
                Err(ApiError::validation_error(
                    "Username and password are required",
                    Some(field_errors),
                ))
            }
        }
    }
}
