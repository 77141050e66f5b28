//! Target URL validation and raw HTTP/1.1 request composition

use url::Url;

use crate::error::{BridgeError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Parsed fetch destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: Url,
    pub host: String,
    pub port: u16,
}

impl Target {
    /// Parse an absolute http(s) URL and derive the tunnel destination
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim())?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(BridgeError::InvalidUrl(format!(
                    "unsupported scheme: {}",
                    other
                )))
            }
        }

        let host = match url.host() {
            Some(url::Host::Ipv6(addr)) => addr.to_string(),
            Some(host) => host.to_string(),
            None => return Err(BridgeError::InvalidUrl("missing host".to_string())),
        };

        let port = url
            .port_or_known_default()
            .ok_or_else(|| BridgeError::InvalidUrl("missing port".to_string()))?;

        Ok(Self { url, host, port })
    }

    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }
}

/// Build the GET request written verbatim onto the tunnel
///
/// `Connection: close` makes the peer end the stream after the body, which
/// is how the assembler detects completion.
pub fn compose_request(url: &Url) -> Vec<u8> {
    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }

    let host = url.host_str().unwrap_or_default();
    let host_header = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    format!(
        "GET {} HTTP/1.1\r\n\
         Host: {}\r\n\
         User-Agent: {}\r\n\
         Accept: {}\r\n\
         Accept-Language: {}\r\n\
         Connection: close\r\n\
         \r\n",
        path, host_header, USER_AGENT, ACCEPT, ACCEPT_LANGUAGE
    )
    .into_bytes()
}
