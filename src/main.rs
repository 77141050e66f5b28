//! Socks Bridge - Entry Point
//!
//! Starts the API server with graceful shutdown support.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use socks_bridge::api::{ApiServer, AppState};
use socks_bridge::config::{Config, LogConfig};
use socks_bridge::proxy::{ProxyRegistry, Socks5Connector};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;

    init_tracing(&config.log);
    info!("Starting Socks Bridge");

    let registry = Arc::new(ProxyRegistry::builtin());
    info!("Loaded {} proxies", registry.len());

    let state = AppState::new(config.clone(), registry, Arc::new(Socks5Connector));
    let api_server = ApiServer::new(state);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut api_task = tokio::spawn(async move { api_server.run(shutdown_rx).await });

    info!(
        "Server started on {} (fetch timeout {:?}, connect timeout {:?})",
        config.api_addr(),
        config.fetch.total_timeout,
        config.fetch.connect_timeout
    );

    tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
        result = &mut api_task => {
            result
                .context("API server task panicked")?
                .context("API server failed")?;
            return Ok(());
        }
    }

    api_task
        .await
        .context("API server task panicked")?
        .context("API server failed")?;

    info!("Socks Bridge stopped");
    Ok(())
}

/// Initialize tracing from `RUST_LOG`, falling back to the configured level
fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("socks_bridge={}", log.level).into());

    if log.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
