use restline::prelude::*;
use tower_http::trace::TraceLayer;

mod controllers;
mod users;

use controllers::{HelloController, LoginController, UserController};
use users::{InMemoryUserService, UserService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    tracing::info!("Starting hello-server...");

    let catalog = MessageCatalog::new()
        .with_messages("zh-CN", [("success", "成功"), ("user not found", "用户不存在")]);

    let app = WebApplication::builder()
        .configure(|container| {
            container.register_shared::<dyn UserService>(Arc::new(InMemoryUserService::default()));
        })
        .controller(HelloController)
        .controller(LoginController)
        .inject_controller::<UserController>()
        .translator(catalog)
        .build()?
        .map_router(|router| router.layer(TraceLayer::new_for_http()));

    for route in app.routes() {
        tracing::info!("  {}", route);
    }

    app.run().await?;
    Ok(())
}
