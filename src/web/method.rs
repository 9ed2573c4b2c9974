use crate::error::BindingError;
use crate::web::param::{Args, Param};
use crate::web::returns::{ReturnDescriptor, ReturnValue};
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// Type-erased call of one controller method.
pub type Invoker =
    Arc<dyn Fn(&mut Args<'_>) -> Result<Vec<ReturnValue>, BindingError> + Send + Sync>;

/// One exported method of a controller: its name, parameter and return
/// declarations, and the call itself.
///
/// Normally produced by `#[controller]`, but can be assembled by hand:
///
/// ```
/// use restline::web::{Method, Param};
/// use restline::web::IntoReturns;
///
/// let method = Method::new("get_by_id")
///     .param(Param::value::<u64>("id"))
///     .returns(<String as IntoReturns>::describe())
///     .invoke(|args| {
///         let id: u64 = args.take(0)?;
///         Ok(format!("user {id}").into_returns())
///     });
/// assert_eq!(method.name(), "get_by_id");
/// ```
#[derive(Clone)]
pub struct Method {
    name: String,
    params: Vec<Param>,
    returns: Vec<ReturnDescriptor>,
    invoker: Option<Invoker>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: Vec::new(),
            invoker: None,
        }
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, returns: Vec<ReturnDescriptor>) -> Self {
        self.returns = returns;
        self
    }

    pub fn invoke<F>(mut self, invoker: F) -> Self
    where
        F: Fn(&mut Args<'_>) -> Result<Vec<ReturnValue>, BindingError> + Send + Sync + 'static,
    {
        self.invoker = Some(Arc::new(invoker));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn return_descriptors(&self) -> &[ReturnDescriptor] {
        &self.returns
    }

    pub fn invoker(&self) -> Option<&Invoker> {
        self.invoker.as_ref()
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("invoker", &self.invoker.is_some())
            .finish()
    }
}

/// A group of request handlers sharing a path prefix.
///
/// Implemented by `#[controller]` on an `impl` block. Methods whose name starts
/// with an HTTP verb become routes, `before` and `after` become hooks around
/// every route of the controller.
pub trait Controller: Send + Sync + 'static {
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Explicit path prefix. Derived from the type name when `None`.
    fn context_mapping(&self) -> Option<&str> {
        None
    }

    fn methods(self: Arc<Self>) -> Vec<Method>;
}
