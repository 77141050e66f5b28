//! Socks Bridge - fetch web pages through public SOCKS5 proxies
//!
//! ## Features
//!
//! - Built-in registry of public SOCKS5 proxies
//! - SOCKS5 CONNECT tunnels with connect and total deadlines
//! - Raw HTTP/1.1 GET over the tunnel with streaming header/body assembly
//! - Proxy probing without sending any request
//! - JSON API with structured, actionable failures

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;

pub use config::Config;
pub use error::{BridgeError, Result};
