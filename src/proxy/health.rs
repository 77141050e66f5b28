//! On-demand proxy probing
//!
//! Opens a tunnel to a well-known destination and tears it down right away,
//! without sending any request.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::config::ProbeConfig;
use crate::error::{BridgeError, Result};
use crate::models::ProbeSuccess;
use crate::proxy::registry::ProxyRegistry;
use crate::proxy::transport::TunnelConnector;

/// Health checker for registry proxies
pub struct HealthChecker {
    registry: Arc<ProxyRegistry>,
    connector: Arc<dyn TunnelConnector>,
    config: ProbeConfig,
}

impl HealthChecker {
    /// Create a new health checker
    pub fn new(
        registry: Arc<ProxyRegistry>,
        connector: Arc<dyn TunnelConnector>,
        config: ProbeConfig,
    ) -> Self {
        Self {
            registry,
            connector,
            config,
        }
    }

    /// Check a single proxy by id
    #[instrument(skip(self))]
    pub async fn check_proxy(&self, proxy_id: i64) -> Result<ProbeSuccess> {
        let proxy = self
            .registry
            .get(proxy_id)
            .ok_or_else(|| BridgeError::InvalidProxy(proxy_id.to_string()))?;

        debug!(
            "Checking proxy {} via {}:{}",
            proxy.address(),
            self.config.target_host,
            self.config.target_port
        );

        let tunnel = self
            .connector
            .connect(
                proxy,
                &self.config.target_host,
                self.config.target_port,
                self.config.timeout,
            )
            .await
            .inspect_err(|e| warn!("Proxy {} is unhealthy: {}", proxy.address(), e))?;
        drop(tunnel);

        debug!("Proxy {} is healthy", proxy.address());
        Ok(ProbeSuccess {
            success: true,
            message: format!("Proxy {} is working!", proxy.address()),
            proxy: proxy.address(),
        })
    }
}
