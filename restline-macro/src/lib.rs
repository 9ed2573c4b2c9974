use proc_macro::TokenStream;

mod controller;
mod injectable;

/// Derive macro for building a struct from the dependency container
///
/// Fields of type `Arc<T>` are resolved from the container, every other field
/// takes its `Default`.
///
/// # Example
/// ```ignore
/// use restline::DeriveInjectable;
///
/// #[derive(DeriveInjectable)]
/// pub struct UserService {
///     repository: Arc<dyn UserRepository>,
/// }
/// ```
#[proc_macro_derive(Injectable)]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Attribute macro turning an `impl` block into a controller method table
///
/// Every `pub fn` taking `&self` whose name starts with an HTTP verb becomes a
/// route, `before` and `after` become hooks. The route path is derived from the
/// method name: `get_by_id(&self, id: u64)` on `UserController` is served at
/// `GET /user/id/{id}`. Other methods are left alone.
///
/// # Example
/// ```ignore
/// use restline::controller;
///
/// pub struct UserController;
///
/// #[controller(path = "/users")]
/// impl UserController {
///     pub fn get_by_id(&self, id: u64, ctx: &mut Context) -> String {
///         format!("user {id}")
///     }
///
///     pub fn post(&self, request: Body<NewUser>) -> BaseResponse {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_attribute(attr, item)
}
