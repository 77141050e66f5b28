//! Proxied fetch handler

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::debug;

use crate::api::handlers::proxy::resolve_proxy_id;
use crate::api::server::AppState;
use crate::error::BridgeError;
use crate::models::{FetchPayload, FetchRequest, FetchSuccess};

/// Fetch a URL through the selected proxy
pub async fn fetch_through_proxy(
    State(state): State<AppState>,
    payload: Result<Json<FetchPayload>, JsonRejection>,
) -> Result<Json<FetchSuccess>, BridgeError> {
    // Unreadable bodies carry no URL; report them like a missing one.
    let Json(payload) = payload.map_err(|rejection| {
        debug!("Rejected fetch body: {}", rejection.body_text());
        BridgeError::InvalidUrl(format!("URL is required ({})", rejection.body_text()))
    })?;

    let url = payload
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| BridgeError::InvalidUrl("URL is required".to_string()))?;
    let proxy_id = resolve_proxy_id(payload.proxy_id, "please select a proxy first")?;

    let success = state
        .fetcher
        .fetch(&FetchRequest::new(url, proxy_id))
        .await?;

    Ok(Json(success))
}
