use crate::common::naming;
use crate::di::Container;
use crate::error::RegistrationError;
use crate::web::endpoint::{Endpoint, Runtime};
use crate::web::handler::Handler;
use crate::web::method::{Controller, Method};
use crate::web::router::{Route, RouteRegistrar};
use crate::web::verb::Verb;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

const BEFORE: &str = "before";
const AFTER: &str = "after";
const BY: &str = "by";

/// Derives routes from controller method names and registers them.
pub struct Dispatcher {
    container: Arc<Container>,
    runtime: Arc<Runtime>,
    routes: BTreeMap<(String, Verb), Route>,
}

impl Dispatcher {
    pub fn new(container: Arc<Container>, runtime: Arc<Runtime>) -> Self {
        Self {
            container,
            runtime,
            routes: BTreeMap::new(),
        }
    }

    /// Routes registered so far, ordered by path then verb.
    pub fn routes(&self) -> Vec<Route> {
        self.routes.values().cloned().collect()
    }

    /// Register every route of `controllers` on `registrar`.
    ///
    /// Stops at the first malformed controller; routes registered before that
    /// stay registered.
    pub fn register<R: RouteRegistrar>(
        &mut self,
        registrar: &mut R,
        controllers: &[Arc<dyn Controller>],
    ) -> Result<(), RegistrationError> {
        for controller in controllers {
            self.register_controller(registrar, Arc::clone(controller))?;
        }
        tracing::info!("Registered {} routes", self.routes.len());
        Ok(())
    }

    fn register_controller<R: RouteRegistrar>(
        &mut self,
        registrar: &mut R,
        controller: Arc<dyn Controller>,
    ) -> Result<(), RegistrationError> {
        let type_name = controller.type_name();
        let short_name = naming::short_type_name(type_name);
        if short_name.is_empty() {
            return Err(RegistrationError::InvalidController {
                name: type_name.to_string(),
                reason: "controller type has no name".to_string(),
            });
        }
        let prefix = match controller.context_mapping() {
            Some(mapping) if !mapping.starts_with('/') => {
                return Err(RegistrationError::InvalidController {
                    name: short_name.to_string(),
                    reason: format!("context mapping {mapping:?} must start with '/'"),
                });
            }
            Some(mapping) => mapping.to_string(),
            None => derive_prefix(short_name),
        };

        let methods = Arc::clone(&controller).methods();
        let mut seen = HashSet::new();
        for method in &methods {
            if !seen.insert(method.name()) {
                return Err(RegistrationError::InvalidMethod {
                    controller: short_name.to_string(),
                    method: method.name().to_string(),
                    reason: "method is defined more than once".to_string(),
                });
            }
        }

        let before = self.hook(type_name, &methods, BEFORE)?;
        let after = self.hook(type_name, &methods, AFTER)?;

        for method in &methods {
            if is_hook(method) {
                continue;
            }
            let Some((verb, sub_path)) = derive_route(method.name()) else {
                tracing::debug!("Skipped {}.{}(): not a route", short_name, method.name());
                continue;
            };
            let path = naming::clean_path(&format!("{prefix}{sub_path}"));
            let route = Route {
                verb,
                path: path.clone(),
                handler: format!("{}.{}", short_name, method.name()),
            };
            if let Some(existing) = self.routes.get(&(path.clone(), verb)) {
                return Err(RegistrationError::DuplicateRoute {
                    verb,
                    path,
                    first: existing.handler.clone(),
                    second: route.handler,
                });
            }

            let handler = Handler::parse(type_name, method, &path, Arc::clone(&self.container))?;
            let endpoint = Endpoint::new(
                route.clone(),
                Arc::new(handler),
                before.clone(),
                after.clone(),
                Arc::clone(&self.runtime),
            );
            registrar.register_route(&route, Arc::new(endpoint))?;
            self.routes.insert((path, verb), route);
        }
        Ok(())
    }

    fn hook(
        &self,
        type_name: &str,
        methods: &[Method],
        hook: &str,
    ) -> Result<Option<Arc<Handler>>, RegistrationError> {
        methods
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(hook))
            .map(|m| Handler::parse(type_name, m, "", Arc::clone(&self.container)).map(Arc::new))
            .transpose()
    }
}

fn is_hook(method: &Method) -> bool {
    method.name().eq_ignore_ascii_case(BEFORE) || method.name().eq_ignore_ascii_case(AFTER)
}

/// Path prefix of a controller without explicit mapping: the type name minus
/// its last word, `UserController` gives `/user`.
pub fn derive_prefix(short_type_name: &str) -> String {
    let mut words = naming::split_words(short_type_name);
    words.pop();
    format!("/{}", naming::lower_camel(&words))
}

/// Verb and sub-path encoded in a method name.
///
/// `GetById` gives `GET /id/{id}`, `GetHelloWorld` gives `GET /helloWorld`, and
/// a bare `Post` gives `POST /`. `None` when the name does not start with a verb.
pub fn derive_route(method_name: &str) -> Option<(Verb, String)> {
    let words = naming::split_words(method_name);
    let (first, rest) = words.split_first()?;
    let verb = Verb::from_token(first)?;

    let sub_path = match rest {
        [by, params @ ..] if !params.is_empty() && by.eq_ignore_ascii_case(BY) => params
            .iter()
            .map(|param| {
                let name = param.to_lowercase();
                format!("/{name}/{{{name}}}")
            })
            .collect(),
        _ => format!("/{}", naming::lower_camel(rest)),
    };
    Some((verb, sub_path))
}
