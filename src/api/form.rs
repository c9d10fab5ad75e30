use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    Form,
};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{ApiError, FieldErrors};
use crate::services::upload_service::{UploadError, UploadedFile};

/// Untyped request fields, whichever encoding they arrived in
#[derive(Debug, Clone, Default)]
pub struct Fields(Map<String, Value>);

impl Fields {
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.0.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    /// Trimmed text; empty strings count as absent
    pub fn text(&self, name: &str) -> Result<Option<String>, String> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err("must be a string".to_string()),
        }
    }

    pub fn number(&self, name: &str) -> Result<Option<f64>, String> {
        let parsed = match self.get(name) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        match parsed {
            Some(value) if value.is_finite() => Ok(Some(value)),
            _ => Err("must be a number".to_string()),
        }
    }

    pub fn integer(&self, name: &str) -> Result<Option<i64>, String> {
        let parsed = match self.get(name) {
            None => return Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            Some(_) => None,
        };
        parsed.map(Some).ok_or_else(|| "must be an integer".to_string())
    }

    /// Lenient boolean used for form bodies and query strings
    pub fn boolean(&self, name: &str) -> Result<Option<bool>, String> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::Number(n)) if n.as_i64() == Some(0) => Ok(Some(false)),
            Some(Value::Number(n)) if n.as_i64() == Some(1) => Ok(Some(true)),
            Some(Value::String(s)) => match s.trim() {
                "" => Ok(None),
                "true" | "1" => Ok(Some(true)),
                "false" | "0" => Ok(Some(false)),
                _ => Err("must be a boolean".to_string()),
            },
            Some(_) => Err("must be a boolean".to_string()),
        }
    }

    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>, String> {
        match self.text(name)? {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| "must be a date in YYYY-MM-DD format".to_string()),
        }
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<HashMap<String, String>> for Fields {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

/// Collects per-field problems so a request reports all of them at once.
///
/// Required accessors hand back a placeholder when the field is missing or
/// invalid; `finish` turns any recorded problem into a 400.
pub struct FieldCheck<'a> {
    fields: &'a Fields,
    errors: FieldErrors,
}

impl<'a> FieldCheck<'a> {
    pub fn new(fields: &'a Fields) -> Self {
        Self {
            fields,
            errors: FieldErrors::new(),
        }
    }

    pub fn reject(&mut self, name: &str, problem: impl Into<String>) {
        self.errors.entry(name.to_string()).or_insert_with(|| problem.into());
    }

    fn record<T>(&mut self, name: &str, result: Result<Option<T>, String>) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(problem) => {
                self.reject(name, problem);
                None
            }
        }
    }

    pub fn text(&mut self, name: &str) -> Option<String> {
        let result = self.fields.text(name);
        self.record(name, result)
    }

    pub fn text_or_empty(&mut self, name: &str) -> String {
        self.text(name).unwrap_or_default()
    }

    pub fn required_text(&mut self, name: &str) -> String {
        match self.text(name) {
            Some(value) => value,
            None => {
                self.reject(name, "is required");
                String::new()
            }
        }
    }

    pub fn number(&mut self, name: &str) -> Option<f64> {
        let result = self.fields.number(name);
        self.record(name, result)
    }

    pub fn integer(&mut self, name: &str) -> Option<i64> {
        let result = self.fields.integer(name);
        self.record(name, result)
    }

    pub fn required_integer(&mut self, name: &str) -> i64 {
        match self.integer(name) {
            Some(value) => value,
            None => {
                self.reject(name, "is required");
                0
            }
        }
    }

    pub fn boolean(&mut self, name: &str) -> Option<bool> {
        let result = self.fields.boolean(name);
        self.record(name, result)
    }

    pub fn date(&mut self, name: &str) -> Option<NaiveDate> {
        let result = self.fields.date(name);
        self.record(name, result)
    }

    pub fn required_date(&mut self, name: &str) -> NaiveDate {
        match self.date(name) {
            Some(value) => value,
            None => {
                self.reject(name, "is required");
                NaiveDate::default()
            }
        }
    }

    /// Raw value for checks that need the exact JSON type
    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.fields.get(name)
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let message = self
            .errors
            .iter()
            .map(|(field, problem)| format!("{} {}", field, problem))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ApiError::validation_error(message, Some(self.errors)))
    }
}

/// Request body as fields plus any uploaded files.
///
/// Accepts `application/json`, `application/x-www-form-urlencoded` and
/// `multipart/form-data`. An empty body yields no fields.
#[derive(Debug, Default)]
pub struct FormPayload {
    pub fields: Fields,
    pub files: HashMap<String, UploadedFile>,
}

#[async_trait]
impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(map) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Ok(FormPayload {
                fields: map.into(),
                files: HashMap::new(),
            });
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(FormPayload::default());
        }
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(FormPayload {
                fields: map.into(),
                files: HashMap::new(),
            }),
            Ok(_) => Err(ApiError::bad_request("Request body must be a JSON object")),
            Err(e) => Err(ApiError::bad_request(format!("Invalid JSON: {}", e))),
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormPayload, ApiError> {
    let mut payload = FormPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                // browsers send an empty part for an untouched file input
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                if payload.files.contains_key(&name) {
                    return Err(UploadError::DuplicateField(name).into());
                }
                payload.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    },
                );
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                payload.fields.insert(name, Value::String(text));
            }
        }
    }

    Ok(payload)
}

/// Query string as fields
#[derive(Debug, Default)]
pub struct QueryFields(pub Fields);

#[async_trait]
impl<S> FromRequestParts<S> for QueryFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(map) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(QueryFields(map.into()))
    }
}

/// Numeric id from the single path parameter. Anything else is a 404.
#[derive(Debug, Clone, Copy)]
pub struct ResourceId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::not_found("Resource not found"))?;
        raw.parse::<i64>()
            .map(ResourceId)
            .map_err(|_| ApiError::not_found("Resource not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map.into(),
            _ => panic!("object expected"),
        }
    }

    #[test]
    fn text_is_trimmed_and_empty_is_absent() {
        let f = fields(json!({"a": "  Kyoto ", "b": "   ", "c": null, "d": 3}));
        assert_eq!(f.text("a"), Ok(Some("Kyoto".to_string())));
        assert_eq!(f.text("b"), Ok(None));
        assert_eq!(f.text("c"), Ok(None));
        assert_eq!(f.text("d"), Ok(Some("3".to_string())));
        assert!(fields(json!({"a": [1]})).text("a").is_err());
    }

    #[test]
    fn numbers_accept_json_and_form_encodings() {
        let f = fields(json!({"n": 1.5, "s": "30000", "bad": "abc", "empty": ""}));
        assert_eq!(f.number("n"), Ok(Some(1.5)));
        assert_eq!(f.number("s"), Ok(Some(30000.0)));
        assert_eq!(f.number("empty"), Ok(None));
        assert!(f.number("bad").is_err());
        assert!(fields(json!({"x": "NaN"})).number("x").is_err());
    }

    #[test]
    fn integers_reject_fractions() {
        let f = fields(json!({"a": 3, "b": 3.0, "c": 3.5, "d": "7"}));
        assert_eq!(f.integer("a"), Ok(Some(3)));
        assert_eq!(f.integer("b"), Ok(Some(3)));
        assert!(f.integer("c").is_err());
        assert_eq!(f.integer("d"), Ok(Some(7)));
    }

    #[test]
    fn dates_use_iso_format() {
        let f = fields(json!({"ok": "2024-04-01", "bad": "04/01/2024"}));
        assert_eq!(
            f.date("ok"),
            Ok(NaiveDate::from_ymd_opt(2024, 4, 1))
        );
        assert!(f.date("bad").is_err());
    }

    #[test]
    fn check_reports_every_problem() {
        let f = fields(json!({"budget": "lots"}));
        let mut check = FieldCheck::new(&f);
        check.required_text("title");
        check.number("budget");
        let err = check.finish().unwrap_err();
        let body = err.to_json();
        assert_eq!(body["field_errors"]["title"], "is required");
        assert_eq!(body["field_errors"]["budget"], "must be a number");
    }

    #[tokio::test]
    async fn reads_json_bodies() {
        let req = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"Kyoto"}"#))
            .unwrap();
        let payload = FormPayload::from_request(req, &()).await.unwrap();
        assert_eq!(payload.fields.text("title"), Ok(Some("Kyoto".to_string())));
    }

    #[tokio::test]
    async fn reads_urlencoded_bodies() {
        for method in ["POST", "PUT"] {
            let req = Request::builder()
                .method(method)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("title=Kyoto&budget=100"))
                .unwrap();
            let payload = FormPayload::from_request(req, &()).await.unwrap();
            assert_eq!(payload.fields.number("budget"), Ok(Some(100.0)), "{}", method);
            assert_eq!(payload.fields.text("title"), Ok(Some("Kyoto".to_string())));
        }
    }

    #[tokio::test]
    async fn empty_body_has_no_fields() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let payload = FormPayload::from_request(req, &()).await.unwrap();
        assert!(payload.fields.get("anything").is_none());
    }

    #[tokio::test]
    async fn rejects_non_object_json() {
        let req = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("[1,2]"))
            .unwrap();
        let err = FormPayload::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn reads_multipart_fields_and_files() {
        let boundary = "X-BOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nKyoto\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"cover_image\"; filename=\"c.png\"\r\n\
             Content-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();
        let payload = FormPayload::from_request(req, &()).await.unwrap();
        assert_eq!(payload.fields.text("title"), Ok(Some("Kyoto".to_string())));
        let file = &payload.files["cover_image"];
        assert_eq!(file.file_name, "c.png");
        assert_eq!(file.content_type, "image/png");
        assert_eq!(&file.bytes[..], b"PNGDATA");
    }

    #[tokio::test]
    async fn rejects_second_file_on_same_field() {
        let boundary = "X-BOUNDARY";
        let part = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"a.png\"\r\n\
             Content-Type: image/png\r\n\r\nA\r\n",
            b = boundary
        );
        let body = format!("{}{}--{}--\r\n", part, part, boundary);
        let req = Request::builder()
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();
        let err = FormPayload::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
