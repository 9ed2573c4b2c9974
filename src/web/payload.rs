use crate::error::BindingError;
use crate::web::context::Context;
use crate::web::param::{Argument, FromArgument, Param};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::LazyLock;
use strum_macros::{Display, EnumIter};

/// Where a payload parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PayloadSource {
    /// JSON request body.
    Body,
    /// `application/x-www-form-urlencoded` request body.
    Form,
    /// URL query string.
    Query,
}

/// A request payload type: decodable and validated before the method runs.
pub trait Payload: DeserializeOwned + garde::Validate<Context = ()> + Send + 'static {}

impl<T> Payload for T where T: DeserializeOwned + garde::Validate<Context = ()> + Send + 'static {}

enum RawPayload<'a> {
    Json(&'a [u8]),
    UrlEncoded(&'a [u8]),
}

type Reader = for<'a> fn(&'a Context) -> RawPayload<'a>;

fn body_reader(ctx: &Context) -> RawPayload<'_> {
    RawPayload::Json(ctx.body())
}

fn form_reader(ctx: &Context) -> RawPayload<'_> {
    RawPayload::UrlEncoded(ctx.body())
}

fn query_reader(ctx: &Context) -> RawPayload<'_> {
    RawPayload::UrlEncoded(ctx.query().as_bytes())
}

static REQUEST_SETS: LazyLock<HashMap<PayloadSource, Reader>> = LazyLock::new(|| {
    HashMap::from([
        (PayloadSource::Body, body_reader as Reader),
        (PayloadSource::Form, form_reader as Reader),
        (PayloadSource::Query, query_reader as Reader),
    ])
});

/// Decode the raw request data of `source` into `T`, without validation.
pub(crate) fn read<T: DeserializeOwned>(
    source: PayloadSource,
    ctx: &Context,
) -> Result<T, BindingError> {
    let decode_error = |message: String| BindingError::Decode {
        origin: source,
        message,
    };
    let reader = REQUEST_SETS
        .get(&source)
        .ok_or_else(|| decode_error("no reader registered".to_string()))?;
    match reader(ctx) {
        RawPayload::Json(bytes) => {
            serde_json::from_slice(bytes).map_err(|e| decode_error(e.to_string()))
        }
        RawPayload::UrlEncoded(bytes) => {
            serde_urlencoded::from_bytes(bytes).map_err(|e| decode_error(e.to_string()))
        }
    }
}

/// Decode and validate a payload.
pub fn decode<T: Payload>(source: PayloadSource, ctx: &Context) -> Result<T, BindingError> {
    let value: T = read(source, ctx)?;
    value.validate().map_err(|report| BindingError::Validation {
        message: report.to_string().trim().to_string(),
    })?;
    Ok(value)
}

macro_rules! payload_wrapper {
    ($(#[$doc:meta])* $name:ident => $source:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name<T>(pub T);

        impl<T> $name<T> {
            pub fn into_inner(self) -> T {
                self.0
            }
        }

        impl<T> Deref for $name<T> {
            type Target = T;

            fn deref(&self) -> &T {
                &self.0
            }
        }

        impl<T> DerefMut for $name<T> {
            fn deref_mut(&mut self) -> &mut T {
                &mut self.0
            }
        }

        impl<T: Payload> FromArgument for $name<T> {
            fn describe(name: &str) -> Param {
                Param::payload::<Self, T>(name, $source)
            }

            fn from_argument(argument: Argument) -> Option<Self> {
                argument.downcast::<T>().map($name)
            }
        }
    };
}

payload_wrapper! {
    /// JSON request body, e.g. `fn post(&self, request: Body<LoginRequest>)`.
    Body => PayloadSource::Body
}

payload_wrapper! {
    /// Url-encoded form body.
    Form => PayloadSource::Form
}

payload_wrapper! {
    /// Query string decoded into a struct.
    Query => PayloadSource::Query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::context::HostRequest;
    use axum::http::Method;
    use garde::Validate;
    use serde::Deserialize;
    use strum::IntoEnumIterator;

    #[derive(Debug, Deserialize, Validate)]
    struct LoginRequest {
        #[garde(length(min = 1))]
        username: String,
        #[garde(length(min = 1))]
        password: String,
    }

    fn ctx(uri: &str, body: &'static str) -> Context {
        Context::new(HostRequest::new(Method::POST, uri.parse().unwrap()).with_body(body))
    }

    #[test]
    fn test_every_source_has_a_reader() {
        for source in PayloadSource::iter() {
            assert!(REQUEST_SETS.contains_key(&source), "{source}");
        }
    }

    #[test]
    fn test_decode_json_body() {
        let ctx = ctx("/login", r#"{"username":"a","password":"b"}"#);
        let login: LoginRequest = decode(PayloadSource::Body, &ctx).unwrap();
        assert_eq!(login.username, "a");
        assert_eq!(login.password, "b");
    }

    #[test]
    fn test_decode_form_and_query() {
        let form = ctx("/login", "username=joe&password=secret");
        let login: LoginRequest = decode(PayloadSource::Form, &form).unwrap();
        assert_eq!(login.username, "joe");

        let query = ctx("/login?username=ann&password=pw", "");
        let login: LoginRequest = decode(PayloadSource::Query, &query).unwrap();
        assert_eq!(login.password, "pw");
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let ctx = ctx("/login", "{not json");
        let err = decode::<LoginRequest>(PayloadSource::Body, &ctx).unwrap_err();
        assert!(matches!(
            err,
            BindingError::Decode {
                origin: PayloadSource::Body,
                ..
            }
        ));
    }

    #[test]
    fn test_validation_runs_after_decode() {
        let ctx = ctx("/login", r#"{"username":"","password":"b"}"#);
        let err = decode::<LoginRequest>(PayloadSource::Body, &ctx).unwrap_err();
        match err {
            BindingError::Validation { message } => assert!(message.contains("username")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
