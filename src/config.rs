use std::env;
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiServerConfig,
    /// Proxied fetch configuration
    pub fetch: FetchConfig,
    /// Proxy probe configuration
    pub probe: ProbeConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port for the API server (default: 3000)
    pub port: u16,
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Allowed CORS origins (comma-separated, empty = any origin)
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    /// Limit for dialing the proxy and completing the SOCKS5 handshake
    pub connect_timeout: Duration,
    /// Deadline covering the whole fetch
    pub total_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            total_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Connect timeout for a probe
    pub timeout: Duration,
    /// Destination host the proxy is asked to reach
    pub target_host: String,
    /// Destination port the proxy is asked to reach
    pub target_port: u16,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            target_host: "google.com".to_string(),
            target_port: 80,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl LogConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            api: ApiServerConfig {
                port: get_env_or("PORT", "3000").parse().map_err(|_| {
                    BridgeError::InvalidConfig("PORT must be a valid port number".into())
                })?,
                host: get_env_or("HOST", "0.0.0.0"),
                cors_origins: get_env_or("CORS_ORIGINS", "")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            fetch: FetchConfig {
                connect_timeout: get_secs("FETCH_CONNECT_TIMEOUT", "10")?,
                total_timeout: get_secs("FETCH_TIMEOUT", "30")?,
            },
            probe: ProbeConfig {
                timeout: get_secs("PROBE_TIMEOUT", "10")?,
                target_host: get_env_or("PROBE_HOST", "google.com"),
                target_port: get_env_or("PROBE_PORT", "80").parse().map_err(|_| {
                    BridgeError::InvalidConfig("PROBE_PORT must be a valid port number".into())
                })?,
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "pretty"),
            },
        })
    }

    /// Get the API server address
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// Parse a non-zero number of seconds
fn get_secs(key: &str, default: &str) -> Result<Duration> {
    let secs: u64 = get_env_or(key, default)
        .parse()
        .map_err(|_| BridgeError::InvalidConfig(format!("{} must be a number of seconds", key)))?;

    if secs == 0 {
        return Err(BridgeError::InvalidConfig(format!(
            "{} must be greater than zero",
            key
        )));
    }

    Ok(Duration::from_secs(secs))
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
