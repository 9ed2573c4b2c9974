//! # restline
//!
//! Convention-based REST routing and request dispatch on top of axum.
//!
//! Controller methods are routed by their names: `get_by_id(&self, id: u64)` on
//! `UserController` is served at `GET /user/id/{id}`, `post(&self, request:
//! Body<LoginRequest>)` on `LoginController` at `POST /login`. Arguments are
//! bound from path segments, JSON or form payloads, the request context, or the
//! dependency container; return values are encoded by type.
//!
//! ## Features
//!
//! - **Derived routes**: no per-method route attributes, the method table is
//!   generated at compile time by `#[controller]`
//! - **Argument binding**: payloads decoded with serde and validated with garde,
//!   typed path segments, injected `Arc<T>` and `Arc<dyn Trait>` dependencies,
//!   request-scoped dependencies built from the live context
//! - **Response envelope**: `{code, message, data}` with translated messages
//! - **Pooled request contexts** and panic isolation per request
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use restline::prelude::*;
//!
//! #[derive(Deserialize, Validate)]
//! pub struct LoginRequest {
//!     #[garde(length(min = 1))]
//!     username: String,
//!     #[garde(length(min = 1))]
//!     password: String,
//! }
//!
//! pub struct LoginController;
//!
//! #[controller]
//! impl LoginController {
//!     pub fn post(&self, request: Body<LoginRequest>) -> Result<BaseResponse, BoxError> {
//!         let data = serde_json::json!({ "user": request.username });
//!         Ok(BaseResponse::with_value(data))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> restline::Result<()> {
//!     WebApplication::builder()
//!         .controller(LoginController)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

extern crate self as restline;

pub mod app;
pub mod common;
pub mod config;
pub mod di;
pub mod error;
pub mod web;

// Re-export core types
pub use app::{WebApplication, WebApplicationBuilder, shutdown_signal};
pub use common::{BaseResponse, Response};
pub use di::{Container, ContainerBuilder, Injectable};
pub use error::{BindingError, EncodingError, RegistrationError, RestlineError, Result};

// Re-export macros
pub use restline_macro::{Injectable as DeriveInjectable, controller};

// Re-export commonly used types from dependencies
pub use axum;
pub use garde;

/// Prelude module for convenient imports
///
/// ```
/// use restline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::{WebApplication, WebApplicationBuilder, shutdown_signal};
    pub use crate::common::{BaseResponse, Response};
    pub use crate::config::{ConfigService, WebProperties};
    pub use crate::di::{Container, ContainerBuilder, Injectable};
    pub use crate::error::RestlineError;
    pub use crate::web::{
        Body, BoxError, Context, Controller, Form, MessageCatalog, Query, Translator,
    };
    pub use crate::{DeriveInjectable, controller};
    pub use garde::Validate;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
