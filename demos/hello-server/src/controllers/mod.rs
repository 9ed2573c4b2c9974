mod hello;
mod login;
mod user;

pub use hello::HelloController;
pub use login::LoginController;
pub use user::UserController;
