use axum::{
    Json,
    http::StatusCode as HttpStatusCode,
    response::{IntoResponse, Response as AxumResponse},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured response capability.
///
/// Controller methods returning a type that implements this trait get the
/// `{code, message, data}` envelope treatment: the dispatcher fills in the
/// code and the (translated) message from the method's error return before the
/// envelope is serialized.
pub trait Response: Send {
    /// Status code carried in the envelope. `0` means unset.
    fn code(&self) -> u16;

    fn set_code(&mut self, code: u16);

    fn message(&self) -> &str;

    fn set_message(&mut self, message: String);

    fn data(&self) -> &Value;

    fn set_data(&mut self, data: Value);

    /// Serialize the envelope. Data is omitted when null.
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&Envelope {
            code: self.code(),
            message: self.message(),
            data: self.data(),
        })
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    code: u16,
    message: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    data: &'a Value,
}

/// Standard response envelope
///
/// # Example
/// ```
/// use restline::common::{BaseResponse, Response};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// let response = BaseResponse::from_data(&User { id: 1, name: "Test User".to_string() }).unwrap();
/// assert_eq!(response.code(), 0);
/// assert_eq!(response.data()["name"], "Test User");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseResponse {
    pub code: u16,

    pub message: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl BaseResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Envelope carrying `data`, code and message left unset.
    pub fn with_value(data: Value) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn from_data<T: Serialize + ?Sized>(data: &T) -> serde_json::Result<Self> {
        Ok(Self::with_value(serde_json::to_value(data)?))
    }

    /// Envelope without data, as written for binding and encoding failures.
    pub fn failure(status: HttpStatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data: Value::Null,
        }
    }

    pub fn code_or(&self, fallback: HttpStatusCode) -> HttpStatusCode {
        HttpStatusCode::from_u16(self.code).unwrap_or(fallback)
    }
}

impl Response for BaseResponse {
    fn code(&self) -> u16 {
        self.code
    }

    fn set_code(&mut self, code: u16) {
        self.code = code;
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn set_message(&mut self, message: String) {
        self.message = message;
    }

    fn data(&self) -> &Value {
        &self.data
    }

    fn set_data(&mut self, data: Value) {
        self.data = data;
    }
}

impl IntoResponse for BaseResponse {
    fn into_response(self) -> AxumResponse {
        let status = self.code_or(HttpStatusCode::OK);
        (status, Json(self)).into_response()
    }
}
