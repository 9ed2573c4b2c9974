use crate::common::{Response, naming};
use crate::di::{Container, MetaData, ScopedInstances};
use crate::error::{BindingError, EncodingError, RegistrationError};
use crate::web::context::Context;
use crate::web::method::{Invoker, Method};
use crate::web::param::{Args, Argument, Param, ParamKind, PathConverter, PayloadDecoder};
use crate::web::payload::PayloadSource;
use crate::web::returns::{BoxError, ReturnDescriptor, ReturnValue};
use axum::http::StatusCode;
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Message key of successful structured responses.
pub const SUCCESS: &str = "success";

/// Where the value of a parameter comes from.
#[derive(Debug, Clone)]
pub enum Binding {
    Payload {
        source: PayloadSource,
        decoder: PayloadDecoder,
    },
    Context,
    Path {
        placeholder: String,
        segment: usize,
        converter: Option<PathConverter>,
    },
    Dependency {
        name: String,
    },
}

/// Parameter metadata computed once at registration.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub param: Param,
    pub qualified_name: String,
    pub binding: Binding,
}

/// One controller method bound to a route.
///
/// Everything here is computed by [`Handler::parse`] at startup and read-only
/// afterwards; per-request state lives in the [`Context`] and the call's
/// argument slots.
pub struct Handler {
    controller: String,
    method: String,
    invoker: Invoker,
    requests: Vec<RequestDescriptor>,
    responses: Vec<ReturnDescriptor>,
    path_param_count: usize,
    dependencies: Vec<Arc<MetaData>>,
    container: Arc<Container>,
}

impl Handler {
    /// Precompute the binding strategy of every parameter of `method`.
    ///
    /// `path` is the final route path; its `{name}` segments are bound to the
    /// leading parameters in order, context and payload parameters skipped.
    pub fn parse(
        controller_type: &str,
        method: &Method,
        path: &str,
        container: Arc<Container>,
    ) -> Result<Self, RegistrationError> {
        let controller = naming::short_type_name(controller_type).to_string();
        let invalid = |reason: String| RegistrationError::InvalidMethod {
            controller: controller.clone(),
            method: method.name().to_string(),
            reason,
        };

        let invoker = method
            .invoker()
            .cloned()
            .ok_or_else(|| invalid("method has no invoker".to_string()))?;

        let placeholders = placeholders(path);
        let path_eligible = method
            .params()
            .iter()
            .filter(|param| !matches!(param.kind(), ParamKind::Context | ParamKind::Payload(_)))
            .count();
        if placeholders.len() > path_eligible {
            return Err(invalid(format!(
                "path {} has {} placeholders but the method declares {} path parameters",
                path,
                placeholders.len(),
                path_eligible
            )));
        }

        let mut dependencies: Vec<Arc<MetaData>> = Vec::new();
        let mut requests = Vec::with_capacity(method.params().len());
        // context and payload parameters never take a placeholder
        let mut path_slot = 0;
        for param in method.params() {
            let qualified_name = param.qualified_name();
            if let Some(meta) = container.get_metadata(&qualified_name) {
                if meta.is_context_aware() && !dependencies.iter().any(|d| d.name() == meta.name()) {
                    dependencies.push(meta);
                }
            }

            let binding = match param.kind() {
                ParamKind::Payload(source) => Binding::Payload {
                    source,
                    decoder: param.decoder().ok_or_else(|| {
                        invalid(format!("payload parameter {} has no decoder", param.name()))
                    })?,
                },
                ParamKind::Context => Binding::Context,
                _ if path_slot < placeholders.len() => {
                    let (segment, placeholder) = &placeholders[path_slot];
                    path_slot += 1;
                    Binding::Path {
                        placeholder: placeholder.clone(),
                        segment: *segment,
                        converter: param.converter(),
                    }
                }
                _ => Binding::Dependency {
                    name: qualified_name.clone(),
                },
            };
            requests.push(RequestDescriptor {
                param: param.clone(),
                qualified_name,
                binding,
            });
        }

        if !path.is_empty() {
            tracing::info!("Mapped \"{}\" onto {}.{}()", path, controller, method.name());
        }

        Ok(Self {
            controller,
            method: method.name().to_string(),
            invoker,
            requests,
            responses: method.return_descriptors().to_vec(),
            path_param_count: placeholders.len(),
            dependencies,
            container,
        })
    }

    /// `Type.method`, as used in logs.
    pub fn name(&self) -> String {
        format!("{}.{}", self.controller, self.method)
    }

    pub fn method_name(&self) -> &str {
        &self.method
    }

    pub fn requests(&self) -> &[RequestDescriptor] {
        &self.requests
    }

    pub fn responses(&self) -> &[ReturnDescriptor] {
        &self.responses
    }

    pub fn path_param_count(&self) -> usize {
        self.path_param_count
    }

    pub fn dependencies(&self) -> &[Arc<MetaData>] {
        &self.dependencies
    }

    /// Bind the arguments, invoke the method and encode its results into `ctx`.
    ///
    /// Returns an error after the error response has been written, so callers
    /// only need it to decide whether to continue the chain.
    pub fn call(&self, ctx: &mut Context) -> Result<(), BindingError> {
        let slots = match self.bind(ctx) {
            Ok(slots) => slots,
            Err(err) => {
                tracing::warn!("{}: {}", self.name(), err);
                ctx.response_error(&err.to_string(), err.status());
                return Err(err);
            }
        };

        let result = {
            let mut args = Args::new(slots, ctx);
            (self.invoker)(&mut args)
        };
        match result {
            Ok(values) => {
                self.response_data(ctx, values);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("{}: {}", self.name(), err);
                ctx.response_error(&err.to_string(), err.status());
                Err(err)
            }
        }
    }

    fn bind(&self, ctx: &Context) -> Result<Vec<Option<Argument>>, BindingError> {
        let segments: Vec<&str> = if self.path_param_count > 0 {
            ctx.path().split('/').collect()
        } else {
            Vec::new()
        };
        let scoped = if self.dependencies.is_empty() {
            ScopedInstances::new()
        } else {
            self.container.resolve_context_aware(ctx, &self.dependencies)
        };

        self.requests
            .iter()
            .map(|request| match &request.binding {
                Binding::Payload { source, decoder } => {
                    decoder(*source, ctx).map(|value| Some(Argument::Value(value)))
                }
                Binding::Context => Ok(None),
                Binding::Path {
                    placeholder,
                    segment,
                    converter,
                } => {
                    let converter = converter.ok_or_else(|| BindingError::UnsupportedConversion {
                        name: placeholder.clone(),
                        type_name: request.param.type_name(),
                    })?;
                    let raw = segments.get(*segment).copied().unwrap_or_default();
                    let conversion_error = |message: String| BindingError::PathConversion {
                        name: placeholder.clone(),
                        value: raw.to_string(),
                        type_name: request.param.type_name(),
                        message,
                    };
                    // decoded per segment so an escaped '/' stays inside its segment
                    let decoded = percent_decode_str(raw)
                        .decode_utf8()
                        .map_err(|e| conversion_error(e.to_string()))?;
                    converter(decoded.as_ref())
                        .map(|value| Some(Argument::Value(value)))
                        .map_err(conversion_error)
                }
                Binding::Dependency { name } => scoped
                    .get(name)
                    .or_else(|| self.container.get_instance(name))
                    .map(|instance| Some(Argument::Instance(instance)))
                    .ok_or_else(|| BindingError::UnsupportedInput {
                        type_name: request.param.type_name().to_string(),
                    }),
            })
            .collect()
    }

    /// Encode the values returned by the method into `ctx`.
    pub fn response_data(&self, ctx: &mut Context, values: Vec<ReturnValue>) {
        Encoding::classify(values).apply(ctx);
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name())
            .field("requests", &self.requests)
            .field("responses", &self.responses)
            .field("path_param_count", &self.path_param_count)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// `{name}` segments of `path` with their segment index.
fn placeholders(path: &str) -> Vec<(usize, String)> {
    path.split('/')
        .enumerate()
        .filter_map(|(index, segment)| {
            segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map(|name| (index, name.to_string()))
        })
        .collect()
}

/// Whether a structured return came with a non-nil error.
enum Outcome {
    Succeeded,
    Failed(BoxError),
}

/// Response encoding, picked from the first return value.
enum Encoding {
    Empty,
    Nil,
    PlainText(String),
    ErrorMessage(BoxError),
    Structured {
        response: Box<dyn Response>,
        outcome: Outcome,
    },
    RawMapping(Map<String, Value>),
    Unsupported(&'static str),
}

impl Encoding {
    fn classify(values: Vec<ReturnValue>) -> Self {
        let mut values = values.into_iter();
        let Some(first) = values.next() else {
            return Encoding::Empty;
        };
        match first {
            ReturnValue::Nil => Encoding::Nil,
            ReturnValue::Text(text) => Encoding::PlainText(text),
            ReturnValue::Error(err) => Encoding::ErrorMessage(err),
            ReturnValue::Response(response) => Encoding::Structured {
                response,
                outcome: match values.next() {
                    Some(ReturnValue::Error(err)) => Outcome::Failed(err),
                    _ => Outcome::Succeeded,
                },
            },
            ReturnValue::Mapping(map) => Encoding::RawMapping(map),
            ReturnValue::Unsupported(type_name) => Encoding::Unsupported(type_name),
        }
    }

    fn apply(self, ctx: &mut Context) {
        match self {
            Encoding::Empty => {
                if !ctx.is_written() {
                    ctx.set_status(StatusCode::OK);
                }
            }
            Encoding::Nil => fail(ctx, EncodingError::NilResponse),
            Encoding::PlainText(text) => ctx.write_text(&text),
            Encoding::ErrorMessage(err) => {
                ctx.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                ctx.write_text(&err.to_string());
            }
            Encoding::Structured {
                mut response,
                outcome,
            } => {
                match outcome {
                    Outcome::Failed(err) => {
                        if response.code() == 0 {
                            response.set_code(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
                        }
                        response.set_message(ctx.translate(&err.to_string()));
                    }
                    Outcome::Succeeded => {
                        response.set_code(StatusCode::OK.as_u16());
                        response.set_message(ctx.translate(SUCCESS));
                    }
                }
                match response.to_json() {
                    Ok(encoded) => {
                        let status = StatusCode::from_u16(response.code())
                            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                        ctx.set_status(status);
                        ctx.write_json_bytes(encoded);
                    }
                    Err(err) => fail(ctx, EncodingError::Serialize(err)),
                }
            }
            Encoding::RawMapping(map) => {
                if let Err(err) = ctx.write_json(&map) {
                    fail(ctx, err);
                }
            }
            Encoding::Unsupported(type_name) => {
                fail(ctx, EncodingError::NotImplemented { type_name });
            }
        }
    }
}

fn fail(ctx: &mut Context, err: EncodingError) {
    tracing::warn!("failed to encode response: {}", err);
    ctx.response_error(&err.to_string(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BaseResponse;
    use crate::web::context::HostRequest;
    use crate::web::param::FromArgument;
    use crate::web::payload::Body;
    use crate::web::returns::IntoReturns;
    use axum::http::Method as HttpMethod;
    use garde::Validate;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize, Validate)]
    struct LoginRequest {
        #[garde(length(min = 1))]
        username: String,
    }

    struct Clock;

    fn context(method: HttpMethod, uri: &str, body: &'static str) -> Context {
        Context::new(HostRequest::new(method, uri.parse().unwrap()).with_body(body))
    }

    fn body_json(ctx: &Context) -> Value {
        serde_json::from_slice(ctx.buffered_body()).unwrap()
    }

    fn get_by_id(calls: Arc<AtomicUsize>) -> Method {
        Method::new("GetById")
            .param(<i64 as FromArgument>::describe("id"))
            .param(Param::context("ctx"))
            .returns(<String as IntoReturns>::describe())
            .invoke(move |args| {
                calls.fetch_add(1, Ordering::SeqCst);
                let id: i64 = args.take(0)?;
                let ctx = args.context();
                Ok(format!("{} {}", ctx.path(), id).into_returns())
            })
    }

    #[test]
    fn test_parse_binding_precedence() {
        let method = Method::new("Post")
            .param(<Body<LoginRequest> as FromArgument>::describe("request"))
            .param(<u32 as FromArgument>::describe("id"))
            .param(Param::context("ctx"))
            .param(<Arc<Clock> as FromArgument>::describe("clock"))
            .invoke(|_| Ok(Vec::new()));
        let handler =
            Handler::parse("app::LoginController", &method, "/login/{id}", Arc::default()).unwrap();

        let bindings: Vec<_> = handler.requests().iter().map(|r| &r.binding).collect();
        assert!(matches!(bindings[0], Binding::Payload { source: PayloadSource::Body, .. }));
        assert!(matches!(
            bindings[1],
            Binding::Path { placeholder, segment: 2, .. } if placeholder == "id"
        ));
        assert!(matches!(bindings[2], Binding::Context));
        assert!(matches!(bindings[3], Binding::Dependency { name } if name == "tests.clock"));
        assert_eq!(handler.path_param_count(), 1);
        assert_eq!(handler.name(), "LoginController.Post");
    }

    #[test]
    fn test_context_before_path_parameter() {
        let method = Method::new("GetById")
            .param(Param::context("ctx"))
            .param(<u64 as FromArgument>::describe("id"))
            .returns(<String as IntoReturns>::describe())
            .invoke(|args| {
                let id: u64 = args.take(1)?;
                Ok(format!("{} {}", args.context().method().map_or("", |m| m.as_str()), id)
                    .into_returns())
            });
        let handler =
            Handler::parse("app::ItemController", &method, "/item/id/{id}", Arc::default()).unwrap();
        assert!(matches!(handler.requests()[1].binding, Binding::Path { .. }));

        let mut ctx = context(HttpMethod::GET, "/item/id/7", "");
        handler.call(&mut ctx).unwrap();
        assert_eq!(ctx.buffered_body(), b"GET 7");

        // context and payload parameters do not count towards placeholders
        let method = Method::new("GetById")
            .param(Param::context("ctx"))
            .invoke(|_| Ok(Vec::new()));
        assert!(matches!(
            Handler::parse("app::ItemController", &method, "/item/id/{id}", Arc::default()),
            Err(RegistrationError::InvalidMethod { .. })
        ));
    }

    #[test]
    fn test_path_segments_are_percent_decoded() {
        let method = Method::new("GetByName")
            .param(<String as FromArgument>::describe("name"))
            .returns(<String as IntoReturns>::describe())
            .invoke(|args| {
                let name: String = args.take(0)?;
                Ok(format!("[{name}]").into_returns())
            });
        let handler = Handler::parse(
            "app::HelloController",
            &method,
            "/hello/name/{name}",
            Arc::default(),
        )
        .unwrap();

        let mut ctx = context(HttpMethod::GET, "/hello/name/joe%20smith", "");
        handler.call(&mut ctx).unwrap();
        assert_eq!(ctx.buffered_body(), b"[joe smith]");

        let mut ctx = context(HttpMethod::GET, "/hello/name/a%2Fb", "");
        handler.call(&mut ctx).unwrap();
        assert_eq!(ctx.buffered_body(), b"[a/b]");

        let mut ctx = context(HttpMethod::GET, "/hello/name/%E4%BD%A0%E5%A5%BD", "");
        handler.call(&mut ctx).unwrap();
        assert_eq!(ctx.buffered_body(), "[你好]".as_bytes());

        let mut ctx = context(HttpMethod::GET, "/hello/name/%FF", "");
        assert!(matches!(
            handler.call(&mut ctx),
            Err(BindingError::PathConversion { .. })
        ));
        assert_eq!(ctx.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_rejects_extra_placeholders() {
        let method = Method::new("GetById").invoke(|_| Ok(Vec::new()));
        let err = Handler::parse("app::UserController", &method, "/user/id/{id}", Arc::default())
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidMethod { .. }));

        let method = Method::new("Get");
        let err = Handler::parse("app::UserController", &method, "/user", Arc::default())
            .unwrap_err();
        assert!(err.to_string().contains("invoker"));
    }

    #[test]
    fn test_call_binds_path_segment() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Handler::parse(
            "app::UserController",
            &get_by_id(Arc::clone(&calls)),
            "/user/id/{id}",
            Arc::default(),
        )
        .unwrap();

        let mut ctx = context(HttpMethod::GET, "/user/id/42", "");
        handler.call(&mut ctx).unwrap();
        assert_eq!(ctx.buffered_body(), b"/user/id/42 42");
        assert_eq!(ctx.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut ctx = context(HttpMethod::GET, "/user/id/abc", "");
        let err = handler.call(&mut ctx).unwrap_err();
        assert!(matches!(err, BindingError::PathConversion { .. }));
        assert_eq!(ctx.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unresolved_dependency_skips_invocation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let method = Method::new("Get")
            .param(<Arc<Clock> as FromArgument>::describe("clock"))
            .invoke(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            });
        let handler = Handler::parse("app::TimeController", &method, "/time", Arc::default())
            .unwrap();

        let mut ctx = context(HttpMethod::GET, "/time", "");
        assert!(handler.call(&mut ctx).is_err());
        assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(&ctx);
        assert!(body["message"].as_str().unwrap().contains("is not supported"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let mut container = Container::new();
        container.register(Clock);
        let handler =
            Handler::parse("app::TimeController", &method, "/time", Arc::new(container)).unwrap();
        let mut ctx = context(HttpMethod::GET, "/time", "");
        handler.call(&mut ctx).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_context_aware_dependency() {
        struct Caller(String);

        let mut container = Container::new();
        container.register_context_aware(|ctx: &Context| {
            Ok(Caller(ctx.header("x-caller").unwrap_or("anonymous").to_string()))
        });
        let method = Method::new("Get")
            .param(<Arc<Caller> as FromArgument>::describe("caller"))
            .returns(<String as IntoReturns>::describe())
            .invoke(|args| {
                let caller: Arc<Caller> = args.take(0)?;
                Ok(caller.0.clone().into_returns())
            });
        let handler =
            Handler::parse("app::WhoController", &method, "/who", Arc::new(container)).unwrap();
        assert_eq!(handler.dependencies().len(), 1);

        let mut ctx = context(HttpMethod::GET, "/who", "");
        handler.call(&mut ctx).unwrap();
        assert_eq!(ctx.buffered_body(), b"anonymous");
    }

    #[test]
    fn test_zero_returns_keep_written_status() {
        let handler = Handler::parse(
            "app::NoopController",
            &Method::new("Get").invoke(|_| Ok(Vec::new())),
            "/",
            Arc::default(),
        )
        .unwrap();

        let mut ctx = context(HttpMethod::GET, "/", "");
        handler.response_data(&mut ctx, Vec::new());
        assert_eq!(ctx.status(), StatusCode::OK);

        let mut ctx = context(HttpMethod::GET, "/", "");
        ctx.set_status(StatusCode::ACCEPTED);
        handler.response_data(&mut ctx, Vec::new());
        assert_eq!(ctx.status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn test_structured_encoding() {
        let handler = Handler::parse(
            "app::UserController",
            &Method::new("Get").invoke(|_| Ok(Vec::new())),
            "/user",
            Arc::default(),
        )
        .unwrap();

        let ok: Result<BaseResponse, BoxError> = Ok(BaseResponse::with_value(Value::from(7)));
        let mut ctx = context(HttpMethod::GET, "/user", "");
        handler.response_data(&mut ctx, ok.into_returns());
        assert_eq!(ctx.status(), StatusCode::OK);
        let body = body_json(&ctx);
        assert_eq!((body["code"].as_u64(), body["message"].as_str()), (Some(200), Some("success")));
        assert_eq!(body["data"], 7);

        let failed: Result<BaseResponse, BoxError> = Err("user not found".into());
        let mut ctx = context(HttpMethod::GET, "/user", "");
        handler.response_data(&mut ctx, failed.into_returns());
        assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&ctx)["message"], "user not found");

        let mut response = BaseResponse::new();
        response.set_code(404);
        let mut ctx = context(HttpMethod::GET, "/user", "");
        handler.response_data(
            &mut ctx,
            (response, Some(BoxError::from("missing"))).into_returns(),
        );
        assert_eq!(ctx.status(), StatusCode::NOT_FOUND);

        // without an error the code and message are always overwritten
        let mut single = BaseResponse::new();
        single.set_code(404);
        single.set_message("custom".to_string());
        let mut ctx = context(HttpMethod::GET, "/user", "");
        handler.response_data(&mut ctx, single.clone().into_returns());
        assert_eq!(ctx.status(), StatusCode::OK);
        let body = body_json(&ctx);
        assert_eq!((body["code"].as_u64(), body["message"].as_str()), (Some(200), Some("success")));

        let mut ctx = context(HttpMethod::GET, "/user", "");
        handler.response_data(&mut ctx, (single, None::<BoxError>).into_returns());
        assert_eq!(ctx.status(), StatusCode::OK);
        assert_eq!(body_json(&ctx)["message"], "success");
    }

    #[test]
    fn test_plain_encodings() {
        let handler = Handler::parse(
            "app::TextController",
            &Method::new("Get").invoke(|_| Ok(Vec::new())),
            "/text",
            Arc::default(),
        )
        .unwrap();

        let mut ctx = context(HttpMethod::GET, "/text", "");
        handler.response_data(&mut ctx, vec![ReturnValue::Error("boom".into())]);
        assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ctx.buffered_body(), b"boom");

        let mut ctx = context(HttpMethod::GET, "/text", "");
        handler.response_data(&mut ctx, vec![ReturnValue::Nil]);
        assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&ctx)["message"], "response is nil");

        let mut ctx = context(HttpMethod::GET, "/text", "");
        handler.response_data(&mut ctx, vec![ReturnValue::Unsupported("u8")]);
        assert_eq!(body_json(&ctx)["message"], "response type is not implemented");

        let mut map = Map::new();
        map.insert("greeting".to_string(), Value::from("hello"));
        let mut ctx = context(HttpMethod::GET, "/text", "");
        handler.response_data(&mut ctx, vec![ReturnValue::Mapping(map)]);
        assert_eq!(body_json(&ctx)["greeting"], "hello");
    }

    #[test]
    fn test_payload_validation_is_bad_request() {
        let method = Method::new("Post")
            .param(<Body<LoginRequest> as FromArgument>::describe("request"))
            .returns(<String as IntoReturns>::describe())
            .invoke(|args| {
                let request: Body<LoginRequest> = args.take(0)?;
                Ok(request.into_inner().username.into_returns())
            });
        let handler = Handler::parse("app::LoginController", &method, "/login", Arc::default())
            .unwrap();

        let mut ctx = context(HttpMethod::POST, "/login", r#"{"username":"joe"}"#);
        handler.call(&mut ctx).unwrap();
        assert_eq!(ctx.buffered_body(), b"joe");

        let mut ctx = context(HttpMethod::POST, "/login", r#"{"username":""}"#);
        assert!(matches!(handler.call(&mut ctx), Err(BindingError::Validation { .. })));
        assert_eq!(ctx.status(), StatusCode::BAD_REQUEST);
    }
}
