//! Proxied fetch orchestration
//!
//! One fetch resolves a proxy, opens a SOCKS5 tunnel, writes a raw GET and
//! assembles the reply, all under a single deadline. The tunnel lives inside
//! the deadline-bounded future, so whichever of completion or expiry comes
//! first also drops (destroys) it.

use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn, Span};
use uuid::Uuid;

use crate::config::FetchConfig;
use crate::error::{BridgeError, Result};
use crate::models::{FetchRequest, FetchSuccess, ProxyEndpoint};
use crate::proxy::assembler::{AssembledResponse, ResponseAssembler};
use crate::proxy::registry::ProxyRegistry;
use crate::proxy::request::{compose_request, Target};
use crate::proxy::transport::TunnelConnector;

pub struct FetchOrchestrator {
    registry: Arc<ProxyRegistry>,
    connector: Arc<dyn TunnelConnector>,
    config: FetchConfig,
}

impl FetchOrchestrator {
    pub fn new(
        registry: Arc<ProxyRegistry>,
        connector: Arc<dyn TunnelConnector>,
        config: FetchConfig,
    ) -> Self {
        Self {
            registry,
            connector,
            config,
        }
    }

    pub fn config(&self) -> FetchConfig {
        self.config
    }

    /// Fetch `request.target_url` through the selected proxy
    #[instrument(
        skip(self, request),
        fields(fetch_id = %Uuid::new_v4(), proxy_id = request.proxy_id, url = %request.target_url, status = tracing::field::Empty)
    )]
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchSuccess> {
        let proxy = self
            .registry
            .get(request.proxy_id)
            .ok_or_else(|| BridgeError::InvalidProxy(request.proxy_id.to_string()))?;
        let target = Target::parse(&request.target_url)?;

        info!(
            "Fetching {} through {}",
            request.target_url,
            proxy.address()
        );
        if target.is_https() {
            debug!("HTTPS target requested; request is sent without TLS");
        }

        let response = match timeout(self.config.total_timeout, self.exchange(proxy, &target)).await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    "Fetch through {} timed out after {:?}",
                    proxy.address(),
                    self.config.total_timeout
                );
                return Err(BridgeError::Timeout(self.config.total_timeout));
            }
        };

        Span::current().record("status", response.status_code);
        info!(
            status = response.status_code,
            body_bytes = response.body.len(),
            "Fetch complete"
        );

        Ok(FetchSuccess {
            success: true,
            status_code: response.status_code,
            body: response.body_text(),
            url: request.target_url.clone(),
            proxy: proxy.address(),
        })
    }

    /// Connect, request and stream one response
    async fn exchange(&self, proxy: &ProxyEndpoint, target: &Target) -> Result<AssembledResponse> {
        let mut tunnel = self
            .connector
            .connect(
                proxy,
                &target.host,
                target.port,
                self.config.connect_timeout,
            )
            .await
            .inspect_err(|e| warn!("Tunnel through {} failed: {}", proxy.address(), e))?;

        let request = compose_request(&target.url);
        tunnel
            .write_all(&request)
            .await
            .map_err(|e| BridgeError::StreamError(format!("failed to send request: {}", e)))?;
        debug!(bytes = request.len(), "Request written to tunnel");

        let (mut assembler, outcome) = ResponseAssembler::new();
        assembler.consume(&mut tunnel).await;
        drop(tunnel);

        outcome
            .await
            .map_err(|_| BridgeError::Internal("response assembler dropped".to_string()))?
    }
}
