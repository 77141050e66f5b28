//! SOCKS5 transport layer
//!
//! Opens tunnels to a destination through an upstream SOCKS5 proxy.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_socks::tcp::Socks5Stream;
use tracing::{debug, instrument};

use crate::error::{BridgeError, Result};
use crate::models::ProxyEndpoint;

/// Byte stream usable as a tunnel
pub trait ProxyConnection: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T> ProxyConnection for T where T: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

/// Opens tunnels through a proxy
///
/// A single attempt per call; retry policy belongs to the caller.
#[async_trait]
pub trait TunnelConnector: Send + Sync {
    /// Negotiate a tunnel to `host:port` through `proxy`
    async fn connect(
        &self,
        proxy: &ProxyEndpoint,
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<TunnelHandle>;
}

/// Production connector speaking SOCKS5 without authentication
#[derive(Debug, Clone, Copy, Default)]
pub struct Socks5Connector;

#[async_trait]
impl TunnelConnector for Socks5Connector {
    #[instrument(skip(self, proxy), fields(proxy = %proxy.address()))]
    async fn connect(
        &self,
        proxy: &ProxyEndpoint,
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<TunnelHandle> {
        debug!("Connecting to SOCKS5 proxy at {}", proxy.address());

        let negotiate = async {
            let socket = TcpStream::connect((proxy.host.as_str(), proxy.port))
                .await
                .map_err(|e| {
                    BridgeError::ProxyUnreachable(format!("TCP connect failed: {}", e))
                })?;

            Socks5Stream::connect_with_socket(socket, (host, port))
                .await
                .map_err(classify_socks_error)
        };

        let stream = match timeout(connect_timeout, negotiate).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(BridgeError::ProxyUnreachable(format!(
                    "no SOCKS5 handshake from {} within {:?}",
                    proxy.address(),
                    connect_timeout
                )))
            }
        };

        debug!("SOCKS5 tunnel to {}:{} established", host, port);
        Ok(TunnelHandle::new(
            Box::new(stream.into_inner()),
            format!("{}:{}", host, port),
        ))
    }
}

/// Split SOCKS failures into "proxy unusable" and "proxy refused the destination"
fn classify_socks_error(err: tokio_socks::Error) -> BridgeError {
    use tokio_socks::Error as SocksError;

    match err {
        SocksError::GeneralSocksServerFailure
        | SocksError::ConnectionNotAllowedByRuleset
        | SocksError::NetworkUnreachable
        | SocksError::HostUnreachable
        | SocksError::ConnectionRefused
        | SocksError::TtlExpired
        | SocksError::CommandNotSupported
        | SocksError::AddressTypeNotSupported => {
            BridgeError::TunnelRejected(format!("SOCKS5 connect failed: {}", err))
        }
        other => BridgeError::ProxyUnreachable(format!("SOCKS5 handshake failed: {}", other)),
    }
}

/// Exclusive ownership of one live tunnel
///
/// Dropping the handle closes the socket. Every fetch path ends by dropping
/// it, so teardown happens exactly once.
pub struct TunnelHandle {
    stream: Box<dyn ProxyConnection>,
    destination: String,
}

impl TunnelHandle {
    pub fn new(stream: Box<dyn ProxyConnection>, destination: impl Into<String>) -> Self {
        Self {
            stream,
            destination: destination.into(),
        }
    }

    /// `host:port` the tunnel was opened to
    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl std::fmt::Debug for TunnelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelHandle")
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

impl Drop for TunnelHandle {
    fn drop(&mut self) {
        debug!(destination = %self.destination, "Tunnel destroyed");
    }
}

impl AsyncRead for TunnelHandle {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for TunnelHandle {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}
