use crate::common::BaseResponse;
use crate::error::{BindingError, EncodingError};
use crate::web::i18n::Translator;
use crate::web::payload::{self, PayloadSource};
use axum::body::{Body, Bytes};
use axum::http::{
    HeaderMap, HeaderName, HeaderValue, Method as HttpMethod, StatusCode, Uri, header,
    request::Parts,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// The host request as handed over by the transport, body already buffered.
#[derive(Debug, Clone)]
pub struct HostRequest {
    pub method: HttpMethod,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HostRequest {
    pub fn new(method: HttpMethod, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Per-request context.
///
/// Wraps the host request and buffers the response: every write replaces the
/// buffered body, and nothing reaches the transport until the dispatcher takes
/// the finished response. Instances are pooled, see [`crate::web::ContextPool`].
#[derive(Default)]
pub struct Context {
    request: Option<HostRequest>,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    written: bool,
    stopped: bool,
    locale: String,
    translator: Option<Arc<dyn Translator>>,
}

impl Context {
    /// Context attached to `request`, without translations.
    pub fn new(request: HostRequest) -> Self {
        Self {
            request: Some(request),
            ..Self::default()
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>, locale: &str) -> Self {
        self.translator = Some(translator);
        self.locale = locale.to_string();
        self
    }

    pub(crate) fn attach(
        &mut self,
        request: HostRequest,
        translator: Arc<dyn Translator>,
        locale: String,
    ) {
        self.request = Some(request);
        self.translator = Some(translator);
        self.locale = locale;
    }

    /// Clear every field so the instance can serve an unrelated request.
    ///
    /// The destructuring is exhaustive on purpose: a new field does not compile
    /// until it is handled here.
    pub fn reset(&mut self) {
        let Context {
            request,
            status,
            headers,
            body,
            written,
            stopped,
            locale,
            translator,
        } = self;
        *request = None;
        *status = StatusCode::OK;
        headers.clear();
        body.clear();
        *written = false;
        *stopped = false;
        locale.clear();
        *translator = None;
    }

    /// Whether a request is attached and the response has not been taken yet.
    pub fn has_writer(&self) -> bool {
        self.request.is_some()
    }

    pub fn method(&self) -> Option<&HttpMethod> {
        self.request.as_ref().map(|r| &r.method)
    }

    pub fn path(&self) -> &str {
        self.request.as_ref().map_or("", |r| r.uri.path())
    }

    pub fn uri(&self) -> Option<&Uri> {
        self.request.as_ref().map(|r| &r.uri)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request
            .as_ref()
            .and_then(|r| r.headers.get(name))
            .and_then(|v| v.to_str().ok())
    }

    /// Raw request body.
    pub fn body(&self) -> &[u8] {
        self.request.as_ref().map_or(&[], |r| r.body.as_ref())
    }

    /// Raw query string, empty when absent.
    pub fn query(&self) -> &str {
        self.request
            .as_ref()
            .and_then(|r| r.uri.query())
            .unwrap_or_default()
    }

    pub fn read_body<T: DeserializeOwned>(&self) -> Result<T, BindingError> {
        payload::read(PayloadSource::Body, self)
    }

    pub fn read_form<T: DeserializeOwned>(&self) -> Result<T, BindingError> {
        payload::read(PayloadSource::Form, self)
    }

    pub fn read_query<T: DeserializeOwned>(&self) -> Result<T, BindingError> {
        payload::read(PayloadSource::Query, self)
    }

    /// URL query parameters. Repeated keys keep the last value.
    pub fn url_params(&self) -> HashMap<String, String> {
        serde_urlencoded::from_str::<Vec<(String, String)>>(self.query())
            .map(|pairs| pairs.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn url_param(&self, key: &str) -> Option<String> {
        self.url_params().remove(key)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Translate `key` for the negotiated locale, falling back to the key itself.
    pub fn translate(&self, key: &str) -> String {
        self.translator
            .as_ref()
            .and_then(|t| t.translate(&self.locale, key))
            .filter(|msg| !msg.is_empty())
            .unwrap_or_else(|| key.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
        self.written = true;
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Whether a status or body has been written for this request.
    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Buffered response body.
    pub fn buffered_body(&self) -> &[u8] {
        &self.body
    }

    /// Write `text` as plain text after translating it.
    pub fn write_text(&mut self, text: &str) {
        let translated = self.translate(text);
        self.replace_body(translated.into_bytes(), TEXT_PLAIN);
    }

    /// Serialize `value` as the JSON body. On failure the buffer is untouched.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodingError> {
        let encoded = serde_json::to_vec(value)?;
        self.replace_body(encoded, APPLICATION_JSON);
        Ok(())
    }

    pub(crate) fn write_json_bytes(&mut self, encoded: Vec<u8>) {
        self.replace_body(encoded, APPLICATION_JSON);
    }

    /// Write the `{code, message}` envelope with a translated message and set the status.
    pub fn response_error(&mut self, message: &str, code: StatusCode) {
        if !self.has_writer() {
            return;
        }
        let response = BaseResponse::failure(code, self.translate(message));
        self.set_status(code);
        self.write_envelope(&response);
    }

    /// Write the `{code, message, data}` envelope using the current status.
    pub fn response_body(&mut self, message: &str, data: serde_json::Value) {
        let response = BaseResponse {
            code: self.status.as_u16(),
            message: self.translate(message),
            data,
        };
        self.write_envelope(&response);
    }

    fn write_envelope(&mut self, response: &BaseResponse) {
        match crate::common::Response::to_json(response) {
            Ok(encoded) => self.write_json_bytes(encoded),
            Err(err) => {
                tracing::error!("failed to encode response envelope: {}", err);
                self.status = StatusCode::INTERNAL_SERVER_ERROR;
                self.replace_body(Vec::new(), TEXT_PLAIN);
            }
        }
    }

    /// Skip the remaining handlers of this request.
    pub fn stop_execution(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Drop everything written so far.
    pub(crate) fn clear_response(&mut self) {
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
        self.written = false;
    }

    /// Hand the buffered response to the transport and detach the writer.
    pub(crate) fn take_response(&mut self) -> axum::response::Response {
        let mut response = axum::response::Response::new(Body::from(std::mem::take(&mut self.body)));
        *response.status_mut() = self.status;
        *response.headers_mut() = std::mem::take(&mut self.headers);
        self.request = None;
        response
    }

    fn replace_body(&mut self, body: Vec<u8>, content_type: &'static str) {
        self.body = body;
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.written = true;
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Context {
            request,
            status,
            headers,
            body,
            written,
            stopped,
            locale,
            translator,
        } = self;
        f.debug_struct("Context")
            .field("request", request)
            .field("status", status)
            .field("headers", headers)
            .field("body", &String::from_utf8_lossy(body))
            .field("written", written)
            .field("stopped", stopped)
            .field("locale", locale)
            .field("translator", &translator.is_some())
            .finish()
    }
}
