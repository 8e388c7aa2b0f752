mod auth;
mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use eventica_core::config::{EventicaConfig, LogFormat};
use eventica_core::service::EventService;
use eventica_core::store::AnyStore;
use tracing_subscriber::{EnvFilter, fmt};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = EventicaConfig::load().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    let store = AnyStore::open(&config).context("Failed to open event store")?;
    let service = EventService::new(store, &config)?;
    let state = AppState::new(service, config.admin_token.clone());

    if config.admin_token.is_none() {
        tracing::warn!("no admin_token configured, add/update/delete/migrate are open");
    }

    let app = routes::app(state.clone(), &config);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen_addr '{}'", config.listen_addr))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "eventica-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and its state clones are gone once serve returns.
    if let Some(service) = state.into_service() {
        service.into_store().close()?;
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutting down");
}
