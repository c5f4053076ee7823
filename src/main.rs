use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use search_relay::core::config::Settings;
use search_relay::core::logging;
use search_relay::server;
use search_relay::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load().context("Failed to load configuration")?;
    logging::init(&settings.logging);

    let bind_addr = settings.bind_addr();
    let state = AppState::initialize(settings).await?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
