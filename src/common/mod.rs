pub mod naming;
pub mod response;

pub use response::{BaseResponse, Response};
