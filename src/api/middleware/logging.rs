//! Request logging middleware
//!
//! Each API call runs inside a `request` span, so fetch and health check spans
//! nest under a per-request id. Failures are logged with their category.

use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::FailureCategory;

/// Request logging middleware
pub struct RequestLogging;

impl RequestLogging {
    /// Log request outcome with the failure category, if any
    pub async fn log_request(req: Request<Body>, next: Next) -> Response {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let span = info_span!("request", request_id = %Uuid::new_v4(), %method, %path);

        async move {
            let start = Instant::now();
            debug!("started");

            let response = next.run(req).await;
            let elapsed = start.elapsed();
            let status = response.status();

            match response.extensions().get::<FailureCategory>() {
                Some(FailureCategory(category)) if status.is_server_error() => {
                    warn!(%status, ?elapsed, category, "request failed");
                }
                Some(FailureCategory(category)) => {
                    info!(%status, ?elapsed, category, "request rejected");
                }
                None => info!(%status, ?elapsed, "request complete"),
            }

            response
        }
        .instrument(span)
        .await
    }
}
