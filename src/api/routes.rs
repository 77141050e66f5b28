//! API route definitions

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::middleware::RequestLogging;
use super::server::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/status", get(handlers::health::status))
        .route("/api/proxies", get(handlers::proxy::list_proxies))
        .route("/api/proxy/test", post(handlers::proxy::test_proxy))
        .route("/api/fetch", post(handlers::fetch::fetch_through_proxy))
        .layer(from_fn(RequestLogging::log_request))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{ApiServerConfig, Config, FetchConfig, LogConfig, ProbeConfig};
    use crate::error::BridgeError;
    use crate::proxy::fetch::tests::FakeConnector;
    use crate::proxy::{compose_request, ProxyRegistry, Target};

    fn test_config() -> Config {
        Config {
            api: ApiServerConfig {
                port: 3000,
                host: "127.0.0.1".to_string(),
                cors_origins: vec![],
            },
            fetch: FetchConfig::default(),
            probe: ProbeConfig::default(),
            log: LogConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    fn router(connector: Arc<FakeConnector>) -> Router {
        create_router(AppState::new(
            test_config(),
            Arc::new(ProxyRegistry::builtin()),
            connector,
        ))
    }

    fn unreachable_connector() -> Arc<FakeConnector> {
        Arc::new(FakeConnector::failing(|| {
            BridgeError::ProxyUnreachable("TCP connect failed: Connection refused".to_string())
        }))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = send(router(unreachable_connector()), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_status_endpoint_reports_registry_size() {
        let (status, body) = send(router(unreachable_connector()), get_request("/api/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["proxies"], 10);
    }

    #[tokio::test]
    async fn test_list_proxies() {
        let (status, body) = send(router(unreachable_connector()), get_request("/api/proxies")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let proxies = body["proxies"].as_array().unwrap();
        assert_eq!(proxies.len(), 10);
        assert_eq!(proxies[3]["id"], 3);
        assert_eq!(proxies[3]["address"], "192.252.210.233:4145");
        assert_eq!(proxies[9]["country"], "Austria");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let stream = tokio_test::io::Builder::new()
            .write(&compose_request(
                &Target::parse("http://example.com/").unwrap().url,
            ))
            .read(b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n")
            .read(b"\r\nHello")
            .build();
        let app = router(Arc::new(FakeConnector::with_stream(stream)));

        let (status, body) = send(
            app,
            post_json(
                "/api/fetch",
                json!({"url": "http://example.com/", "proxyId": 3}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["statusCode"], 200);
        assert_eq!(body["body"], "Hello");
        assert_eq!(body["url"], "http://example.com/");
        assert_eq!(body["proxy"], "192.252.210.233:4145");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_proxy() {
        let (status, body) = send(
            router(unreachable_connector()),
            post_json(
                "/api/fetch",
                json!({"url": "http://example.com/", "proxyId": 0}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("connection failed"));
        assert!(body["details"].as_str().unwrap().contains("Connection refused"));
        assert!(!body["suggestion"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_invalid_proxy_skips_network() {
        let connector = unreachable_connector();
        let (status, body) = send(
            router(connector.clone()),
            post_json(
                "/api/fetch",
                json!({"url": "http://example.com/", "proxyId": 10}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid proxy ID");
        assert_eq!(connector.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_requires_url_and_proxy() {
        let (status, body) = send(
            router(unreachable_connector()),
            post_json("/api/fetch", json!({"proxyId": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid URL");

        let (status, body) = send(
            router(unreachable_connector()),
            post_json("/api/fetch", json!({"url": "http://example.com/"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid proxy ID");
    }

    #[tokio::test]
    async fn test_fetch_accepts_numeric_string_proxy_id() {
        let stream = tokio_test::io::Builder::new()
            .write(&compose_request(
                &Target::parse("http://example.com/").unwrap().url,
            ))
            .read(b"HTTP/1.1 200 OK\r\n\r\nHello")
            .build();
        let app = router(Arc::new(FakeConnector::with_stream(stream)));

        let (status, body) = send(
            app,
            post_json(
                "/api/fetch",
                json!({"url": "http://example.com/", "proxyId": "3"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["body"], "Hello");
        assert_eq!(body["proxy"], "192.252.210.233:4145");
    }

    #[tokio::test]
    async fn test_fetch_without_content_type_is_structured_failure() {
        let connector = unreachable_connector();
        let request = Request::builder()
            .method("POST")
            .uri("/api/fetch")
            .body(Body::from(
                json!({"url": "http://example.com/", "proxyId": "3"}).to_string(),
            ))
            .unwrap();

        let (status, body) = send(router(connector.clone()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid URL");
        assert!(!body["suggestion"].as_str().unwrap().is_empty());
        assert_eq!(connector.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_tunnel_rejected() {
        let connector = Arc::new(FakeConnector::failing(|| {
            BridgeError::TunnelRejected("host unreachable".to_string())
        }));

        let (status, body) = send(
            router(connector.clone()),
            post_json(
                "/api/fetch",
                json!({"url": "http://example.com/", "proxyId": 4}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Proxy tunnel connection failed");
        assert!(body["details"].as_str().unwrap().contains("host unreachable"));
        assert_eq!(body["suggestion"], "Try a different proxy from the list");
        assert_eq!(connector.calls(), 1);
    }

    #[tokio::test]
    async fn test_proxy_test_rejects_malformed_body() {
        let connector = unreachable_connector();
        let request = Request::builder()
            .method("POST")
            .uri("/api/proxy/test")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap();

        let (status, body) = send(router(connector.clone()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid proxy ID");
        assert!(!body["suggestion"].as_str().unwrap().is_empty());
        assert_eq!(connector.calls(), 0);
    }

    #[tokio::test]
    async fn test_probe_success() {
        let (local, _remote) = tokio::io::duplex(64);
        let app = router(Arc::new(FakeConnector::with_stream(local)));

        let (status, body) =
            send(app, post_json("/api/proxy/test", json!({"proxyId": 2}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["proxy"], "192.252.211.193:4145");
    }

    #[tokio::test]
    async fn test_probe_failure_is_reported_in_body() {
        let (status, body) = send(
            router(unreachable_connector()),
            post_json("/api/proxy/test", json!({"proxyId": 7})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Proxy connection failed");
        assert_eq!(body["suggestion"], "Try a different proxy from the list");
    }

    #[tokio::test]
    async fn test_probe_invalid_proxy() {
        let connector = unreachable_connector();
        let (status, body) = send(
            router(connector.clone()),
            post_json("/api/proxy/test", json!({"proxyId": -1})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(connector.calls(), 0);
    }
}
