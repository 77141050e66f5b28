use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::FailureBody;

/// Unified error type for the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    // Caller errors, surfaced before any network attempt
    #[error("Invalid proxy ID: {0}")]
    InvalidProxy(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Tunnel establishment
    #[error("SOCKS5 proxy unreachable: {0}")]
    ProxyUnreachable(String),

    #[error("SOCKS5 CONNECT rejected: {0}")]
    TunnelRejected(String),

    // Established tunnel
    #[error("Tunnel stream error: {0}")]
    StreamError(String),

    #[error("No response within {0:?}")]
    Timeout(Duration),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            BridgeError::InvalidProxy(_)
            | BridgeError::InvalidUrl(_)
            | BridgeError::InvalidConfig(_) => StatusCode::BAD_REQUEST,

            // 502 Bad Gateway
            BridgeError::ProxyUnreachable(_)
            | BridgeError::TunnelRejected(_)
            | BridgeError::StreamError(_) => StatusCode::BAD_GATEWAY,

            // 504 Gateway Timeout
            BridgeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,

            // 500 Internal Server Error
            BridgeError::Io(_) | BridgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short error category shown to API callers
    pub fn category(&self) -> &'static str {
        match self {
            BridgeError::InvalidProxy(_) => "Invalid proxy ID",
            BridgeError::InvalidUrl(_) => "Invalid URL",
            BridgeError::ProxyUnreachable(_) => "Proxy connection failed",
            BridgeError::TunnelRejected(_) => "Proxy tunnel connection failed",
            BridgeError::StreamError(_) => "Failed to fetch through proxy",
            BridgeError::Timeout(_) => "Request timeout",
            BridgeError::InvalidConfig(_) => "Invalid configuration",
            BridgeError::Io(_) | BridgeError::Internal(_) => "Internal error",
        }
    }

    /// Remediation hint shown alongside the category
    pub fn suggestion(&self) -> &'static str {
        match self {
            BridgeError::InvalidProxy(_) => "Select a proxy from the list first",
            BridgeError::InvalidUrl(_) => "Enter an absolute http:// or https:// URL",
            BridgeError::ProxyUnreachable(_) | BridgeError::TunnelRejected(_) => {
                "Try a different proxy from the list"
            }
            BridgeError::StreamError(_) => "This proxy may be slow or offline. Try another one.",
            BridgeError::Timeout(_) => {
                "This proxy is too slow. Try a different one with better uptime."
            }
            BridgeError::InvalidConfig(_) | BridgeError::Io(_) | BridgeError::Internal(_) => {
                "Try again later"
            }
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Render as the structured failure payload
    pub fn to_failure(&self) -> FailureBody {
        FailureBody {
            success: false,
            error: self.category().to_string(),
            details: self.to_string(),
            suggestion: self.suggestion().to_string(),
        }
    }
}

/// Failure category attached to error responses for request logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureCategory(pub &'static str);

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), Json(self.to_failure())).into_response();
        response
            .extensions_mut()
            .insert(FailureCategory(self.category()));
        response
    }
}

impl From<url::ParseError> for BridgeError {
    fn from(err: url::ParseError) -> Self {
        BridgeError::InvalidUrl(err.to_string())
    }
}
