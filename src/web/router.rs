use crate::error::RegistrationError;
use crate::web::endpoint::Endpoint;
use crate::web::verb::Verb;
use axum::Router;
use axum::extract::Request;
use axum::routing::{MethodFilter, on};
use std::fmt;
use std::sync::Arc;

/// A derived (verb, path) pair and the handler it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    pub verb: Verb,
    pub path: String,
    /// `Type.method` of the bound handler.
    pub handler: String,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path)
    }
}

/// Host router seam: stores (verb, path) → endpoint.
pub trait RouteRegistrar {
    fn register_route(
        &mut self,
        route: &Route,
        endpoint: Arc<Endpoint>,
    ) -> Result<(), RegistrationError>;
}

/// Registers endpoints on an axum [`Router`].
#[derive(Default)]
pub struct AxumRegistrar {
    router: Router,
}

impl AxumRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing router, e.g. one carrying static routes.
    pub fn with_router(router: Router) -> Self {
        Self { router }
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl RouteRegistrar for AxumRegistrar {
    fn register_route(
        &mut self,
        route: &Route,
        endpoint: Arc<Endpoint>,
    ) -> Result<(), RegistrationError> {
        let filter = MethodFilter::try_from(route.verb.as_method())
            .map_err(|_| RegistrationError::UnsupportedVerb { verb: route.verb })?;
        let handler = move |request: Request| {
            let endpoint = Arc::clone(&endpoint);
            async move { endpoint.serve(request).await }
        };
        let router = std::mem::take(&mut self.router);
        self.router = router.route(&route.path, on(filter, handler));
        Ok(())
    }
}
