//! Read-only table of known SOCKS5 proxies
//!
//! Built once at startup and shared between concurrent fetches.

use crate::models::{ProxyEndpoint, ProxySummary};

/// Public SOCKS5 proxies shipped with the bridge, indexed by position
const BUILTIN_PROXIES: &[(&str, u16, &str, &str)] = &[
    ("213.35.110.67", 10800, "Singapore", "67%"),
    ("192.252.214.17", 4145, "United States", "69%"),
    ("192.252.211.193", 4145, "United States", "98%"),
    ("192.252.210.233", 4145, "United States", "100%"),
    ("98.175.31.195", 4145, "United States", "91%"),
    ("98.188.47.132", 4145, "United States", "80%"),
    ("72.195.101.99", 4145, "United States", "99%"),
    ("178.62.116.7", 1080, "United Kingdom", "25%"),
    ("128.199.37.92", 1080, "Netherlands", "29%"),
    ("95.163.153.116", 20184, "Austria", "50%"),
];

/// Immutable proxy lookup
#[derive(Debug, Clone)]
pub struct ProxyRegistry {
    endpoints: Vec<ProxyEndpoint>,
}

impl ProxyRegistry {
    pub fn new(endpoints: Vec<ProxyEndpoint>) -> Self {
        Self { endpoints }
    }

    /// Registry populated with the bundled proxy list
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_PROXIES
                .iter()
                .map(|&(host, port, country, uptime)| {
                    ProxyEndpoint::new(host, port, country, uptime)
                })
                .collect(),
        )
    }

    /// Look up a proxy by id; negative and out-of-range ids yield `None`
    pub fn get(&self, id: i64) -> Option<&ProxyEndpoint> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.endpoints.get(index))
    }

    /// All proxies in registry order
    pub fn list(&self) -> Vec<ProxySummary> {
        self.endpoints
            .iter()
            .enumerate()
            .map(|(id, endpoint)| ProxySummary::from_endpoint(id, endpoint))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
