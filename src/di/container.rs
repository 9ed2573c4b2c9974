use crate::common::naming;
use crate::di::scoped::ScopedInstances;
use crate::error::{RestlineError, Result};
use crate::web::Context;
use dashmap::DashMap;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// Registry value. Always an `Arc<T>` behind the `Any`, so sized types and
/// `dyn Trait` downcast the same way.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Builds a request-scoped instance from the live context.
pub type InstanceFactory = Arc<dyn Fn(&Context) -> Result<Instance> + Send + Sync>;

#[derive(Clone)]
pub enum Scope {
    Singleton(Instance),
    ContextAware(InstanceFactory),
}

/// Registered entry: qualified name, type and how to obtain the instance.
pub struct MetaData {
    name: String,
    type_name: &'static str,
    scope: Scope,
}

impl MetaData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn is_context_aware(&self) -> bool {
        matches!(self.scope, Scope::ContextAware(_))
    }
}

impl fmt::Debug for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaData")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("context_aware", &self.is_context_aware())
            .finish()
    }
}

/// Thread-safe dependency registry keyed by qualified lower-camel type name
/// (`services.userService` for `app::services::UserService`).
#[derive(Clone, Default)]
pub struct Container {
    entries: DashMap<String, Arc<MetaData>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Send + Sync + 'static>(&mut self, instance: T) -> &mut Self {
        self.register_shared(Arc::new(instance))
    }

    /// Register a shared instance, e.g. an `Arc<dyn UserRepository>`, under the
    /// name of `T`.
    pub fn register_shared<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        instance: Arc<T>,
    ) -> &mut Self {
        let name = naming::lower_camel_full_name(type_name::<T>());
        self.register_named(&name, instance)
    }

    pub fn register_named<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: &str,
        instance: Arc<T>,
    ) -> &mut Self {
        self.insert(name, type_name::<T>(), Scope::Singleton(Arc::new(instance)))
    }

    /// Register a factory run once per request that needs `T`.
    pub fn register_context_aware<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Context) -> Result<T> + Send + Sync + 'static,
    {
        let name = naming::lower_camel_full_name(type_name::<T>());
        let factory: InstanceFactory = Arc::new(move |ctx: &Context| {
            let instance = factory(ctx)?;
            Ok(Arc::new(Arc::new(instance)) as Instance)
        });
        self.insert(&name, type_name::<T>(), Scope::ContextAware(factory))
    }

    fn insert(&mut self, name: &str, type_name: &'static str, scope: Scope) -> &mut Self {
        let previous = self.entries.insert(
            name.to_string(),
            Arc::new(MetaData {
                name: name.to_string(),
                type_name,
                scope,
            }),
        );
        if previous.is_some() {
            tracing::warn!("Replaced dependency {} ({})", name, type_name);
        }
        self
    }

    /// Singleton registered under `name`. Context-aware entries are not returned.
    pub fn get_instance(&self, name: &str) -> Option<Instance> {
        self.entries.get(name).and_then(|meta| match &meta.scope {
            Scope::Singleton(instance) => Some(Arc::clone(instance)),
            Scope::ContextAware(_) => None,
        })
    }

    pub fn get_metadata(&self, name: &str) -> Option<Arc<MetaData>> {
        self.entries.get(name).map(|meta| Arc::clone(meta.value()))
    }

    /// Run the factories of `dependencies` for one request.
    ///
    /// A failing factory is logged and its dependency left unresolved.
    pub fn resolve_context_aware(
        &self,
        ctx: &Context,
        dependencies: &[Arc<MetaData>],
    ) -> ScopedInstances {
        let mut instances = ScopedInstances::new();
        for meta in dependencies {
            let Scope::ContextAware(factory) = &meta.scope else {
                continue;
            };
            match factory(ctx) {
                Ok(instance) => instances.insert(meta.name(), instance),
                Err(err) => tracing::warn!(
                    "Failed to create context aware dependency {}: {}",
                    meta.name(),
                    err
                ),
            }
        }
        instances
    }

    /// Typed lookup of a singleton.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let name = naming::lower_camel_full_name(type_name::<T>());
        let meta = self
            .get_metadata(&name)
            .ok_or_else(|| RestlineError::DependencyNotFound {
                type_name: type_name::<T>().to_string(),
            })?;
        let Scope::Singleton(instance) = &meta.scope else {
            return Err(RestlineError::ScopeMismatch {
                message: format!(
                    "{} is context aware and only available while handling a request",
                    type_name::<T>()
                ),
            });
        };
        Arc::clone(instance)
            .downcast::<Arc<T>>()
            .map(|inner| Arc::clone(inner.as_ref()))
            .map_err(|_| RestlineError::DowncastFailed {
                type_name: type_name::<T>().to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn contains_type<T: ?Sized + 'static>(&self) -> bool {
        self.contains(&naming::lower_camel_full_name(type_name::<T>()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::HostRequest;
    use axum::http::Method;

    struct TestService {
        value: i32,
    }

    trait MyTrait: Send + Sync {
        fn get_value(&self) -> i32;
    }

    struct MyTraitImpl {
        value: i32,
    }

    impl MyTrait for MyTraitImpl {
        fn get_value(&self) -> i32 {
            self.value
        }
    }

    #[derive(Debug)]
    struct RequestUser {
        name: String,
    }

    fn context(uri: &str) -> Context {
        Context::new(HostRequest::new(Method::GET, uri.parse().unwrap()))
    }

    #[test]
    fn test_register_and_resolve() {
        let mut container = Container::new();
        container.register(TestService { value: 42 });
        let service = container.resolve::<TestService>().unwrap();
        assert_eq!(service.value, 42);
        assert!(container.contains("tests.testService"));
    }

    #[test]
    fn test_register_and_resolve_trait() {
        let mut container = Container::new();
        container.register_shared::<dyn MyTrait>(Arc::new(MyTraitImpl { value: 99 }));
        let trait_instance = container.resolve::<dyn MyTrait>().unwrap();
        assert_eq!(trait_instance.get_value(), 99);
        assert!(container.get_instance("tests.myTrait").is_some());
        assert!(container.contains_type::<dyn MyTrait>());
        assert!(!container.contains_type::<TestService>());
    }

    #[test]
    fn test_missing_dependency() {
        let container = Container::new();
        assert!(matches!(
            container.resolve::<TestService>(),
            Err(RestlineError::DependencyNotFound { .. })
        ));
    }

    #[test]
    fn test_context_aware_resolution() {
        let mut container = Container::new();
        container.register_context_aware(|ctx: &Context| {
            let name = ctx.url_param("user").ok_or_else(|| RestlineError::Internal(
                "no user".to_string(),
            ))?;
            Ok(RequestUser { name })
        });

        assert!(container.get_instance("tests.requestUser").is_none());
        assert!(matches!(
            container.resolve::<RequestUser>(),
            Err(RestlineError::ScopeMismatch { .. })
        ));

        let meta = container.get_metadata("tests.requestUser").unwrap();
        assert!(meta.is_context_aware());

        let scoped = container.resolve_context_aware(&context("/?user=ann"), &[Arc::clone(&meta)]);
        let user = scoped
            .get("tests.requestUser")
            .unwrap()
            .downcast::<Arc<RequestUser>>()
            .unwrap();
        assert_eq!(user.name, "ann");

        // failing factories leave the dependency unresolved
        let scoped = container.resolve_context_aware(&context("/"), &[meta]);
        assert!(scoped.is_empty());
    }
}
