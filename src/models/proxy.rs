use serde::{Deserialize, Serialize};

/// Upstream SOCKS5 proxy entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
    pub country: String,
    pub uptime: String,
}

impl ProxyEndpoint {
    pub fn new(host: &str, port: u16, country: &str, uptime: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            country: country.to_string(),
            uptime: uptime.to_string(),
        }
    }

    /// `host:port` form used in logs and API responses
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Proxy as exposed by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxySummary {
    pub id: usize,
    pub host: String,
    pub port: u16,
    pub country: String,
    pub uptime: String,
    pub address: String,
}

impl ProxySummary {
    pub fn from_endpoint(id: usize, endpoint: &ProxyEndpoint) -> Self {
        Self {
            id,
            host: endpoint.host.clone(),
            port: endpoint.port,
            country: endpoint.country.clone(),
            uptime: endpoint.uptime.clone(),
            address: endpoint.address(),
        }
    }
}

/// Proxy listing response
#[derive(Debug, Serialize)]
pub struct ProxyListResponse {
    pub success: bool,
    pub proxies: Vec<ProxySummary>,
}
