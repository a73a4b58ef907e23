//! Conversation gateway
//!
//! (c) Softlandia 2025

use anyhow::anyhow;
use conversation_gateway::config::GatewayConfig;
use conversation_gateway::infrastructure::database::DatabaseConnection;
use conversation_gateway::{app, build_provider};
use log::info;
use tokio::runtime::{Builder, Runtime};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env()?;
    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(web_server_task(config))
}

async fn web_server_task(config: GatewayConfig) -> anyhow::Result<()> {
    let provider = build_provider(config.clone())
        .map_err(|e| anyhow!("invalid service registrations: {e:?}"))?;

    provider
        .get_required::<DatabaseConnection>()
        .migrate()
        .await?;

    let app = app(provider, &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
    }
}
