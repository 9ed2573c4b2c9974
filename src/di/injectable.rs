use crate::di::Container;
use crate::error::Result;

/// Types built from the dependency container.
///
/// Usually derived: fields of type `Arc<T>` are resolved from the container,
/// every other field takes its `Default`.
///
/// # Example
/// ```
/// use restline::DeriveInjectable;
/// use restline::di::{Container, Injectable};
/// use std::sync::Arc;
///
/// pub trait UserRepository: Send + Sync {
///     fn name(&self, id: u64) -> String;
/// }
///
/// struct InMemoryRepository;
///
/// impl UserRepository for InMemoryRepository {
///     fn name(&self, id: u64) -> String {
///         format!("user-{id}")
///     }
/// }
///
/// #[derive(DeriveInjectable)]
/// pub struct UserService {
///     repository: Arc<dyn UserRepository>,
///     calls: u32,
/// }
///
/// let mut container = Container::new();
/// container.register_shared::<dyn UserRepository>(Arc::new(InMemoryRepository));
/// let service = UserService::inject(&container).unwrap();
/// assert_eq!(service.repository.name(7), "user-7");
/// assert_eq!(service.calls, 0);
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// # Errors
    /// Returns an error if a required dependency is not registered.
    fn inject(container: &Container) -> Result<Self>;
}
