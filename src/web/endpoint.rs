use crate::config::WebProperties;
use crate::error::RestlineError;
use crate::web::context::{Context, HostRequest};
use crate::web::handler::Handler;
use crate::web::i18n::{MessageCatalog, Translator, negotiate_locale};
use crate::web::pool::ContextPool;
use crate::web::router::Route;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use uuid::Uuid;

const INTERNAL_ERROR: &str = "internal server error";

/// Request-time collaborators shared by every endpoint.
pub struct Runtime {
    pool: ContextPool,
    translator: Arc<dyn Translator>,
    default_locale: String,
    body_limit: usize,
}

impl Runtime {
    pub fn new(translator: Arc<dyn Translator>, properties: &WebProperties) -> Self {
        Self {
            pool: ContextPool::new(properties.context_pool_capacity),
            translator,
            default_locale: properties.default_locale.clone(),
            body_limit: properties.body_limit,
        }
    }

    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(MessageCatalog::new()), &WebProperties::default())
    }
}

/// One registered route: the handler plus the controller's hooks.
pub struct Endpoint {
    route: Route,
    handler: Arc<Handler>,
    before: Option<Arc<Handler>>,
    after: Option<Arc<Handler>>,
    runtime: Arc<Runtime>,
}

impl Endpoint {
    pub fn new(
        route: Route,
        handler: Arc<Handler>,
        before: Option<Arc<Handler>>,
        after: Option<Arc<Handler>>,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            route,
            handler,
            before,
            after,
            runtime,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Run the hook chain on an attached context.
    ///
    /// A failing or stopping `before` hook skips the handler; `after` runs
    /// unless the chain was stopped.
    pub fn handle(&self, ctx: &mut Context) {
        if let Some(before) = &self.before {
            if before.call(ctx).is_err() || ctx.is_stopped() {
                return;
            }
        }
        if self.handler.call(ctx).is_err() || ctx.is_stopped() {
            return;
        }
        if let Some(after) = &self.after {
            // errors are already written to the response
            let _ = after.call(ctx);
        }
    }

    /// Serve a request whose body is already buffered.
    pub fn dispatch(&self, request: HostRequest) -> Response {
        let span = tracing::info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method,
            path = %request.uri.path()
        );
        let _enter = span.enter();

        let locale = negotiate_locale(&request.uri, &request.headers, &self.runtime.default_locale);
        let mut ctx = self.runtime.pool.acquire();
        ctx.attach(request, Arc::clone(&self.runtime.translator), locale);

        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| self.handle(&mut ctx))) {
            tracing::error!(
                "{} panicked in {}: {}",
                self.route,
                self.route.handler,
                panic_message(panic.as_ref())
            );
            ctx.clear_response();
            ctx.response_error(INTERNAL_ERROR, StatusCode::INTERNAL_SERVER_ERROR);
        }

        let response = ctx.take_response();
        tracing::debug!(status = %response.status(), "completed {}", self.route);
        response
    }

    /// Buffer the body of an axum request and dispatch it.
    pub async fn serve(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();
        match axum::body::to_bytes(body, self.runtime.body_limit).await {
            Ok(bytes) => self.dispatch(HostRequest::from_parts(parts, bytes)),
            Err(err) => {
                tracing::warn!("{}: {}", self.route, err);
                RestlineError::RequestBody(err.to_string()).into_response()
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::Container;
    use crate::web::Verb;
    use crate::web::method::Method;
    use crate::web::param::Param;
    use crate::web::returns::IntoReturns;
    use axum::body::to_bytes;
    use axum::http::{Method as HttpMethod, StatusCode};

    fn endpoint(method: Method, before: Option<Method>, runtime: Arc<Runtime>) -> Endpoint {
        let container = Arc::new(Container::new());
        let handler =
            Handler::parse("app::TestController", &method, "/test", Arc::clone(&container)).unwrap();
        let before = before.map(|hook| {
            Arc::new(Handler::parse("app::TestController", &hook, "", container).unwrap())
        });
        Endpoint::new(
            Route {
                verb: Verb::Get,
                path: "/test".to_string(),
                handler: handler.name(),
            },
            Arc::new(handler),
            before,
            None,
            runtime,
        )
    }

    fn get() -> HostRequest {
        HostRequest::new(HttpMethod::GET, "/test".parse().unwrap())
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let runtime = Arc::new(Runtime::default());
        let method = Method::new("Get").invoke(|args| {
            args.context().write_text("half written");
            panic!("boom");
        });
        let endpoint = endpoint(method, None, Arc::clone(&runtime));

        let response = endpoint.dispatch(get());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], INTERNAL_ERROR);
        assert_eq!(runtime.pool().idle(), 1);
    }

    #[tokio::test]
    async fn test_before_hook_can_stop_the_chain() {
        let method = Method::new("Get")
            .returns(<&str as IntoReturns>::describe())
            .invoke(|_| Ok("reached".into_returns()));
        let hook = Method::new("Before").param(Param::context("ctx")).invoke(|args| {
            let ctx = args.context();
            if ctx.header("authorization").is_none() {
                ctx.response_error("unauthorized", StatusCode::UNAUTHORIZED);
                ctx.stop_execution();
            }
            Ok(Vec::new())
        });
        let endpoint = endpoint(method, Some(hook), Arc::new(Runtime::default()));

        let response = endpoint.dispatch(get());
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let authorized = get().with_header(
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_static("Bearer token"),
        );
        let response = endpoint.dispatch(authorized);
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"reached");
    }
}
