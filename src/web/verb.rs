use axum::http::Method as HttpMethod;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// HTTP verbs a controller method name may start with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Verb {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Connect,
    Options,
    Trace,
}

impl Verb {
    /// Verb named by the leading word of a method name, if any.
    pub fn from_token(token: &str) -> Option<Self> {
        token.parse().ok()
    }

    pub fn as_method(&self) -> HttpMethod {
        match self {
            Verb::Get => HttpMethod::GET,
            Verb::Head => HttpMethod::HEAD,
            Verb::Post => HttpMethod::POST,
            Verb::Put => HttpMethod::PUT,
            Verb::Patch => HttpMethod::PATCH,
            Verb::Delete => HttpMethod::DELETE,
            Verb::Connect => HttpMethod::CONNECT,
            Verb::Options => HttpMethod::OPTIONS,
            Verb::Trace => HttpMethod::TRACE,
        }
    }
}
