mod application;
mod shutdown;

pub use application::{WebApplication, WebApplicationBuilder};
pub use shutdown::shutdown_signal;
