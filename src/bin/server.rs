use std::sync::Arc;

use anyhow::Context;
use longsum::ai::client::OpenAiFactory;
use longsum::api::{AppState, router};
use longsum::core::config::AppConfig;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    longsum::setup_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let factory = OpenAiFactory::new(&config).context("failed to build HTTP client")?;
    let bind_addr = config.bind_addr;

    let app = router(AppState::new(config, Arc::new(factory)));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(%bind_addr, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
