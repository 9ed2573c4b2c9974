use crate::di::Container;
use crate::error::Result;
use crate::web::Context;
use std::sync::Arc;

/// Builder for constructing a dependency container
///
/// # Example
/// ```
/// use restline::di::ContainerBuilder;
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {}
/// struct SystemClock;
/// impl Clock for SystemClock {}
///
/// let container = ContainerBuilder::new()
///     .register(String::from("greeting"))
///     .register_shared::<dyn Clock>(Arc::new(SystemClock))
///     .build();
/// assert_eq!(container.len(), 2);
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service instance
    pub fn register<T: Send + Sync + 'static>(mut self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    /// Register a shared instance, trait objects included
    pub fn register_shared<T: ?Sized + Send + Sync + 'static>(mut self, instance: Arc<T>) -> Self {
        self.container.register_shared(instance);
        self
    }

    pub fn register_named<T: ?Sized + Send + Sync + 'static>(
        mut self,
        name: &str,
        instance: Arc<T>,
    ) -> Self {
        self.container.register_named(name, instance);
        self
    }

    pub fn register_context_aware<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Context) -> Result<T> + Send + Sync + 'static,
    {
        self.container.register_context_aware(factory);
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}
