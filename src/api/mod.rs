//! API server implementation
//!
//! Provides the REST endpoints callers use to list, probe and fetch through proxies.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use server::{ApiServer, AppState};
