//! Application bootstrap
//!
//! Ties the dependency container, the controllers and the translator together,
//! runs route registration once, and serves the resulting router.

use crate::app::shutdown::shutdown_signal;
use crate::config::WebProperties;
use crate::di::{Container, Injectable};
use crate::error::Result;
use crate::web::{
    AxumRegistrar, Controller, Dispatcher, MessageCatalog, Route, Runtime, Translator,
};
use axum::Router;
use std::sync::Arc;

/// A web application with its routes registered.
///
/// # Example
///
/// ```rust,no_run
/// use restline::prelude::*;
///
/// pub struct HelloController;
///
/// #[controller]
/// impl HelloController {
///     pub fn get(&self) -> String {
///         "Hello, World".to_string()
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> restline::Result<()> {
///     WebApplication::builder()
///         .controller(HelloController)
///         .build()?
///         .run()
///         .await
/// }
/// ```
pub struct WebApplication {
    container: Arc<Container>,
    router: Router,
    routes: Vec<Route>,
    properties: WebProperties,
}

impl WebApplication {
    pub fn builder() -> WebApplicationBuilder {
        WebApplicationBuilder::new()
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Registered routes, ordered by path.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn properties(&self) -> &WebProperties {
        &self.properties
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Wrap the router, e.g. to add tower layers.
    pub fn map_router(mut self, f: impl FnOnce(Router) -> Router) -> Self {
        self.router = f(self.router);
        self
    }

    /// Serve on `SERVER_HOST:SERVER_PORT` until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let address = self.properties.address();
        let listener = tokio::net::TcpListener::bind(&address).await?;
        tracing::info!("Listening on {}", address);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

enum ControllerSource {
    Ready(Arc<dyn Controller>),
    Injected(fn(&Container) -> Result<Arc<dyn Controller>>),
}

fn inject<C: Injectable + Controller>(container: &Container) -> Result<Arc<dyn Controller>> {
    Ok(Arc::new(C::inject(container)?))
}

/// Builder for [`WebApplication`]
#[derive(Default)]
pub struct WebApplicationBuilder {
    container: Container,
    controllers: Vec<ControllerSource>,
    translator: Option<Arc<dyn Translator>>,
    properties: Option<WebProperties>,
    router: Option<Router>,
}

impl WebApplicationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dependency container
    pub fn container(mut self, container: Container) -> Self {
        self.container = container;
        self
    }

    /// Register more dependencies on the current container
    pub fn configure(mut self, f: impl FnOnce(&mut Container)) -> Self {
        f(&mut self.container);
        self
    }

    pub fn controller<C: Controller>(self, controller: C) -> Self {
        self.shared_controller(Arc::new(controller))
    }

    pub fn shared_controller(mut self, controller: Arc<dyn Controller>) -> Self {
        self.controllers.push(ControllerSource::Ready(controller));
        self
    }

    /// Controller built from the container at [`build`](Self::build) time
    pub fn inject_controller<C: Injectable + Controller>(mut self) -> Self {
        self.controllers
            .push(ControllerSource::Injected(inject::<C>));
        self
    }

    pub fn translator(mut self, translator: impl Translator) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    /// Defaults to [`WebProperties::from_env`]
    pub fn properties(mut self, properties: WebProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Router the controller routes are added to
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Build controllers and register their routes
    ///
    /// # Errors
    ///
    /// Fails on unresolvable controller dependencies, invalid properties and
    /// malformed controllers.
    pub fn build(self) -> Result<WebApplication> {
        let properties = match self.properties {
            Some(properties) => properties,
            None => WebProperties::from_env()?,
        };

        let controllers = self
            .controllers
            .into_iter()
            .map(|source| match source {
                ControllerSource::Ready(controller) => Ok(controller),
                ControllerSource::Injected(inject) => inject(&self.container),
            })
            .collect::<Result<Vec<_>>>()?;

        let container = Arc::new(self.container);
        let translator = self
            .translator
            .unwrap_or_else(|| Arc::new(MessageCatalog::new()));
        let runtime = Arc::new(Runtime::new(translator, &properties));

        let mut dispatcher = Dispatcher::new(Arc::clone(&container), runtime);
        let mut registrar = AxumRegistrar::with_router(self.router.unwrap_or_default());
        dispatcher.register(&mut registrar, &controllers)?;

        Ok(WebApplication {
            container,
            router: registrar.into_router(),
            routes: dispatcher.routes(),
            properties,
        })
    }
}
