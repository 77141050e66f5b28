//! API server using Axum
//!
//! Serves the proxy listing, probe and fetch endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{BridgeError, Result};
use crate::proxy::{FetchOrchestrator, HealthChecker, ProxyRegistry, TunnelConnector};

use super::middleware::cors_layer;
use super::routes;

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: Arc<ProxyRegistry>,
    pub fetcher: Arc<FetchOrchestrator>,
    pub health: Arc<HealthChecker>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the core services around one registry and connector
    pub fn new(
        config: Config,
        registry: Arc<ProxyRegistry>,
        connector: Arc<dyn TunnelConnector>,
    ) -> Self {
        let fetcher = Arc::new(FetchOrchestrator::new(
            registry.clone(),
            connector.clone(),
            config.fetch,
        ));
        let health = Arc::new(HealthChecker::new(
            registry.clone(),
            connector,
            config.probe.clone(),
        ));

        Self {
            config,
            registry,
            fetcher,
            health,
            started_at: Instant::now(),
        }
    }
}

/// API server
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        routes::create_router(self.state.clone())
            .layer(ServiceBuilder::new().layer(cors_layer(&self.state.config.api.cors_origins)))
    }

    /// Run the API server
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr: SocketAddr = self.state.config.api_addr().parse().map_err(|_| {
            BridgeError::InvalidConfig(format!(
                "Invalid API server address: {}",
                self.state.config.api_addr()
            ))
        })?;

        let router = self.build_router();

        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| BridgeError::Internal(e.to_string()))?;

        info!("API server shut down");
        Ok(())
    }
}
