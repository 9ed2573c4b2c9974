use crate::common::BaseResponse;
use crate::web::{PayloadSource, Verb};
use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RestlineError>;

#[derive(Debug, Error)]
pub enum RestlineError {
    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Scope mismatch: {message}")]
    ScopeMismatch { message: String },

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Invalid configuration value for {key}: {message}")]
    Config { key: String, message: String },

    #[error("Failed to read request body: {0}")]
    RequestBody(String),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RestlineError {
    pub fn status(&self) -> StatusCode {
        match self {
            RestlineError::Binding(err) => err.status(),
            RestlineError::RequestBody(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for RestlineError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        BaseResponse::failure(status, self.to_string()).into_response()
    }
}

/// Malformed controllers. Returned while the route table is built and aborts boot.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid controller {name}: {reason}")]
    InvalidController { name: String, reason: String },

    #[error("invalid method {controller}.{method}(): {reason}")]
    InvalidMethod {
        controller: String,
        method: String,
        reason: String,
    },

    #[error("duplicate route {verb} {path}: {first} and {second}")]
    DuplicateRoute {
        verb: Verb,
        path: String,
        first: String,
        second: String,
    },

    #[error("http verb {verb} can not be routed")]
    UnsupportedVerb { verb: Verb },
}

/// Failures while turning request data into method arguments.
///
/// The target method is never invoked once one of these occurs.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("failed to decode {origin} payload: {message}")]
    Decode {
        origin: PayloadSource,
        message: String,
    },

    #[error("{message}")]
    Validation { message: String },

    #[error("path parameter {name}: can not convert {value:?} to {type_name}: {message}")]
    PathConversion {
        name: String,
        value: String,
        type_name: &'static str,
        message: String,
    },

    #[error("path parameter {name}: type {type_name} can not be converted from a path segment")]
    UnsupportedConversion {
        name: String,
        type_name: &'static str,
    },

    #[error("input type: {type_name} is not supported!")]
    UnsupportedInput { type_name: String },

    #[error("argument {index} is not a {expected}")]
    Argument { index: usize, expected: &'static str },
}

impl BindingError {
    pub fn status(&self) -> StatusCode {
        match self {
            BindingError::Decode { .. }
            | BindingError::Validation { .. }
            | BindingError::PathConversion { .. } => StatusCode::BAD_REQUEST,
            BindingError::UnsupportedConversion { .. }
            | BindingError::UnsupportedInput { .. }
            | BindingError::Argument { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failures while turning return values into a response. Always a 500.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("response is nil")]
    NilResponse,

    #[error("response type is not implemented")]
    NotImplemented { type_name: &'static str },

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_error_status() {
        let decode = BindingError::Decode {
            origin: PayloadSource::Body,
            message: "eof".to_string(),
        };
        assert_eq!(decode.status(), StatusCode::BAD_REQUEST);

        let unsupported = BindingError::UnsupportedInput {
            type_name: "alloc::sync::Arc<app::Missing>".to_string(),
        };
        assert_eq!(unsupported.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(unsupported.to_string().contains("is not supported"));
    }

    #[test]
    fn test_restline_error_status() {
        let err = RestlineError::from(BindingError::Validation {
            message: "username: length is lower than 1".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RestlineError::from(EncodingError::NilResponse).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
