//! Proxy listing and probing handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::debug;

use crate::api::server::AppState;
use crate::error::{BridgeError, Result};
use crate::models::{ProxyId, ProxyListResponse, ProxyTestPayload};

/// Registry index from a client-supplied id
pub(crate) fn resolve_proxy_id(proxy_id: Option<ProxyId>, missing: &str) -> Result<i64> {
    let proxy_id = proxy_id.ok_or_else(|| BridgeError::InvalidProxy(missing.to_string()))?;
    proxy_id
        .index()
        .ok_or_else(|| BridgeError::InvalidProxy(proxy_id.to_string()))
}

/// List all proxies
pub async fn list_proxies(State(state): State<AppState>) -> impl IntoResponse {
    Json(ProxyListResponse {
        success: true,
        proxies: state.registry.list(),
    })
}

/// Probe a proxy by opening and closing a tunnel through it
pub async fn test_proxy(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProxyTestPayload>, JsonRejection>,
) -> Response {
    let proxy_id = match payload {
        Ok(Json(payload)) => resolve_proxy_id(payload.proxy_id, "no proxy selected"),
        Err(rejection) => {
            debug!("Rejected proxy test body: {}", rejection.body_text());
            Err(BridgeError::InvalidProxy(format!(
                "no proxy selected ({})",
                rejection.body_text()
            )))
        }
    };
    let proxy_id = match proxy_id {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match state.health.check_proxy(proxy_id).await {
        Ok(probe) => Json(probe).into_response(),
        Err(e) if e.is_client_error() => e.into_response(),
        // A dead proxy is a valid probe answer, not a failed API call.
        Err(e) => {
            let mut failure = e.to_failure();
            failure.error = "Proxy connection failed".to_string();
            (StatusCode::OK, Json(failure)).into_response()
        }
    }
}
