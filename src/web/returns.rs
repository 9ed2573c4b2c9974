use crate::common::{BaseResponse, Response};
use serde_json::{Map, Value};
use std::any::type_name;
use std::fmt;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Declared kind of one return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Text,
    Error,
    Response,
    Mapping,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnDescriptor {
    pub kind: ReturnKind,
    pub type_name: &'static str,
}

impl ReturnDescriptor {
    pub fn of<T: ?Sized>(kind: ReturnKind) -> Self {
        Self {
            kind,
            type_name: type_name::<T>(),
        }
    }
}

/// One value produced by a controller method.
pub enum ReturnValue {
    Nil,
    Text(String),
    Error(BoxError),
    Response(Box<dyn Response>),
    Mapping(Map<String, Value>),
    Unsupported(&'static str),
}

impl fmt::Debug for ReturnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnValue::Nil => f.write_str("Nil"),
            ReturnValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ReturnValue::Error(err) => f.debug_tuple("Error").field(&err.to_string()).finish(),
            ReturnValue::Response(response) => f
                .debug_struct("Response")
                .field("code", &response.code())
                .field("message", &response.message())
                .finish(),
            ReturnValue::Mapping(map) => f.debug_tuple("Mapping").field(map).finish(),
            ReturnValue::Unsupported(name) => f.debug_tuple("Unsupported").field(name).finish(),
        }
    }
}

/// Return types a controller method may declare.
pub trait IntoReturns {
    fn describe() -> Vec<ReturnDescriptor>;

    fn into_returns(self) -> Vec<ReturnValue>;
}

impl IntoReturns for () {
    fn describe() -> Vec<ReturnDescriptor> {
        Vec::new()
    }

    fn into_returns(self) -> Vec<ReturnValue> {
        Vec::new()
    }
}

impl IntoReturns for String {
    fn describe() -> Vec<ReturnDescriptor> {
        vec![ReturnDescriptor::of::<String>(ReturnKind::Text)]
    }

    fn into_returns(self) -> Vec<ReturnValue> {
        vec![ReturnValue::Text(self)]
    }
}

impl IntoReturns for &'static str {
    fn describe() -> Vec<ReturnDescriptor> {
        vec![ReturnDescriptor::of::<str>(ReturnKind::Text)]
    }

    fn into_returns(self) -> Vec<ReturnValue> {
        vec![ReturnValue::Text(self.to_string())]
    }
}

impl IntoReturns for BoxError {
    fn describe() -> Vec<ReturnDescriptor> {
        vec![ReturnDescriptor::of::<BoxError>(ReturnKind::Error)]
    }

    fn into_returns(self) -> Vec<ReturnValue> {
        vec![ReturnValue::Error(self)]
    }
}

impl IntoReturns for BaseResponse {
    fn describe() -> Vec<ReturnDescriptor> {
        vec![ReturnDescriptor::of::<BaseResponse>(ReturnKind::Response)]
    }

    fn into_returns(self) -> Vec<ReturnValue> {
        vec![ReturnValue::Response(Box::new(self))]
    }
}

impl IntoReturns for Option<BaseResponse> {
    fn describe() -> Vec<ReturnDescriptor> {
        vec![ReturnDescriptor::of::<BaseResponse>(ReturnKind::Response)]
    }

    fn into_returns(self) -> Vec<ReturnValue> {
        match self {
            Some(response) => response.into_returns(),
            None => vec![ReturnValue::Nil],
        }
    }
}

impl IntoReturns for Map<String, Value> {
    fn describe() -> Vec<ReturnDescriptor> {
        vec![ReturnDescriptor::of::<Map<String, Value>>(ReturnKind::Mapping)]
    }

    fn into_returns(self) -> Vec<ReturnValue> {
        vec![ReturnValue::Mapping(self)]
    }
}

/// Objects are mappings, any other JSON value has no encoding.
impl IntoReturns for Value {
    fn describe() -> Vec<ReturnDescriptor> {
        vec![ReturnDescriptor::of::<Value>(ReturnKind::Mapping)]
    }

    fn into_returns(self) -> Vec<ReturnValue> {
        match self {
            Value::Object(map) => vec![ReturnValue::Mapping(map)],
            Value::Null => vec![ReturnValue::Nil],
            _ => vec![ReturnValue::Unsupported(type_name::<Value>())],
        }
    }
}

/// Response paired with an optional error.
impl<E: Into<BoxError>> IntoReturns for (BaseResponse, Option<E>) {
    fn describe() -> Vec<ReturnDescriptor> {
        vec![
            ReturnDescriptor::of::<BaseResponse>(ReturnKind::Response),
            ReturnDescriptor::of::<E>(ReturnKind::Error),
        ]
    }

    fn into_returns(self) -> Vec<ReturnValue> {
        let (response, err) = self;
        vec![
            ReturnValue::Response(Box::new(response)),
            err.map_or(ReturnValue::Nil, |e| ReturnValue::Error(e.into())),
        ]
    }
}

/// `Err` is encoded as an unset response carrying the error.
impl<E: Into<BoxError>> IntoReturns for Result<BaseResponse, E> {
    fn describe() -> Vec<ReturnDescriptor> {
        vec![
            ReturnDescriptor::of::<BaseResponse>(ReturnKind::Response),
            ReturnDescriptor::of::<E>(ReturnKind::Error),
        ]
    }

    fn into_returns(self) -> Vec<ReturnValue> {
        match self {
            Ok(response) => (response, None::<BoxError>).into_returns(),
            Err(err) => (BaseResponse::default(), Some(err)).into_returns(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_keeps_two_slots() {
        let ok: Result<BaseResponse, String> = Ok(BaseResponse::with_value(json!(1)));
        let values = ok.into_returns();
        assert_eq!(values.len(), 2);
        assert!(matches!(values[0], ReturnValue::Response(_)));
        assert!(matches!(values[1], ReturnValue::Nil));

        let err: Result<BaseResponse, String> = Err("user not found".to_string());
        let values = err.into_returns();
        match &values[..] {
            [ReturnValue::Response(response), ReturnValue::Error(e)] => {
                assert_eq!(response.code(), 0);
                assert_eq!(e.to_string(), "user not found");
            }
            other => panic!("unexpected values: {other:?}"),
        }
    }

    #[test]
    fn test_describe_matches_arity() {
        assert!(<() as IntoReturns>::describe().is_empty());
        assert_eq!(<String as IntoReturns>::describe()[0].kind, ReturnKind::Text);
        let kinds: Vec<_> = <Result<BaseResponse, BoxError> as IntoReturns>::describe()
            .into_iter()
            .map(|d| d.kind)
            .collect();
        assert_eq!(kinds, vec![ReturnKind::Response, ReturnKind::Error]);
    }

    #[test]
    fn test_json_values() {
        assert!(matches!(
            json!({"a": 1}).into_returns()[0],
            ReturnValue::Mapping(_)
        ));
        assert!(matches!(json!([1, 2]).into_returns()[0], ReturnValue::Unsupported(_)));
        assert!(matches!(None::<BaseResponse>.into_returns()[0], ReturnValue::Nil));
    }
}
