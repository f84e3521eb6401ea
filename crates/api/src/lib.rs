//! HTTP surface for the claim tracker.
//!
//! Serves process liveness and the webhook placeholder:
//! - `GET /` banner
//! - `GET /health` liveness probe
//! - `POST /webhook` for webhook-mode delivery (polling is the default)

use axum::http::{Method, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// API server failure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The bind address could not be parsed.
    #[error("invalid bind address: {0}")]
    Address(#[from] std::net::AddrParseError),
    /// Socket or serve failure.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
}

async fn index() -> &'static str {
    "DeFi Claim Tracker is running!"
}

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse { status: "healthy" })
}

// Webhook-mode placeholder; update intake runs in polling mode for now.
async fn webhook() -> Json<StatusResponse> {
    Json(StatusResponse { status: "success" })
}

/// Builds the application router with CORS and request tracing.
#[must_use]
pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// HTTP server bound to a host and port.
#[derive(Debug, Clone)]
pub struct ApiServer {
    /// Bind address, e.g. "0.0.0.0".
    pub host: String,
    /// Listen port.
    pub port: u16,
}

impl ApiServer {
    /// Creates a server for the given bind address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Serves until Ctrl-C.
    ///
    /// # Errors
    /// Returns an error if the address is invalid, cannot be bound, or the
    /// server fails while running.
    pub async fn serve(&self) -> Result<(), ApiError> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    ///
    /// # Errors
    /// Returns an error if the address is invalid, cannot be bound, or the
    /// server fails while running.
    pub async fn serve_with_shutdown<F>(&self, shutdown: F) -> Result<(), ApiError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.host, self.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(address = %addr, "API server listening");

        axum::serve(listener, router())
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_index_banner() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"DeFi Claim Tracker is running!");
    }

    #[tokio::test]
    async fn test_health_reports_healthy() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_webhook_accepts_post_only() {
        let post = Request::builder()
            .method(Method::POST)
            .uri("/webhook")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(post).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], "success");

        let get = Request::builder().uri("/webhook").body(Body::empty()).unwrap();
        let response = router().oneshot(get).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
