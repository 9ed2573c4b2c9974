//! Route derivation and request dispatch.

pub mod context;
pub mod dispatcher;
pub mod endpoint;
pub mod handler;
pub mod i18n;
pub mod method;
pub mod param;
pub mod payload;
pub mod pool;
pub mod returns;
pub mod router;
pub mod verb;

pub use context::{Context, HostRequest};
pub use dispatcher::{Dispatcher, derive_prefix, derive_route};
pub use endpoint::{Endpoint, Runtime};
pub use handler::{Binding, Handler, RequestDescriptor, SUCCESS};
pub use i18n::{MessageCatalog, Translator, negotiate_locale};
pub use method::{Controller, Invoker, Method};
pub use param::{Args, Argument, FromArgument, Param, ParamKind, PrimitiveKind};
pub use payload::{Body, Form, Payload, PayloadSource, Query};
pub use pool::{ContextPool, PooledContext};
pub use returns::{BoxError, IntoReturns, ReturnDescriptor, ReturnKind, ReturnValue};
pub use router::{AxumRegistrar, Route, RouteRegistrar};
pub use verb::Verb;
