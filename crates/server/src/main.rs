#![forbid(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use ng_server::{AppState, Config, build_router};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,ng_server=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = Config::parse();
    let state = AppState::from_config(&config)?;
    tracing::info!(
        db_dir = %config.db_dir.display(),
        upload_dir = %config.upload_dir.display(),
        "store ready"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "notegraph server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown requested");
}
