//! Proxied fetch engine
//!
//! This module provides the core of the bridge:
//! - Read-only registry of upstream SOCKS5 proxies
//! - SOCKS5 tunnel establishment
//! - Raw HTTP/1.1 request composition
//! - Streaming response assembly
//! - Fetch orchestration under a single deadline
//! - On-demand proxy probing

pub mod assembler;
pub mod fetch;
pub mod health;
pub mod registry;
pub mod request;
pub mod transport;

pub use assembler::{AssembledResponse, AssemblerState, ResponseAssembler};
pub use fetch::FetchOrchestrator;
pub use health::HealthChecker;
pub use registry::ProxyRegistry;
pub use request::{compose_request, Target};
pub use transport::{ProxyConnection, Socks5Connector, TunnelConnector, TunnelHandle};
