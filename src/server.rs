//! Scrape endpoint serving the metric registry.

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use log::error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::metrics::MetricRegistry;

/// Router with a single GET route at `metrics_path`; everything else is 404.
pub fn router(registry: Arc<MetricRegistry>, metrics_path: &str) -> Router {
    Router::new()
        .route(metrics_path, get(handle_metrics))
        .with_state(registry)
}

async fn handle_metrics(State(registry): State<Arc<MetricRegistry>>) -> Response {
    match registry.encode_text() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics").into_response()
        }
    }
}

/// Serve `app` on `listener` until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, app: Router, shutdown: CancellationToken) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Metrics server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{PackageName, PackageSample};
    use crate::vdb::ScanOutcome;
    use std::net::SocketAddr;
    use std::time::Duration;

    async fn start(registry: Arc<MetricRegistry>, path: &str) -> (SocketAddr, CancellationToken) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        tokio::spawn(serve(listener, router(registry, path), shutdown.clone()));
        (addr, shutdown)
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_text_format() {
        let registry = Arc::new(MetricRegistry::new().unwrap());
        registry
            .publish(&ScanOutcome {
                samples: vec![PackageSample {
                    category: "app-shells".to_string(),
                    package: PackageName::parse("bash-5.2_p37-r1").unwrap(),
                    repository: "gentoo".to_string(),
                    slot: "0".to_string(),
                }],
                skipped: 0,
                elapsed: Duration::from_millis(20),
            })
            .unwrap();
        let (addr, shutdown) = start(registry, "/metrics").await;

        let response = reqwest::get(format!("http://{}/metrics", addr)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let content_type = response.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/plain"));

        let body = response.text().await.unwrap();
        assert!(body.contains(r#"PF="bash-5.2_p37-r1""#));
        assert!(body.contains(r#"PVR="5.2_p37-r1""#));
        assert!(body.contains("portage_installed_duration 0.02"));

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_other_paths_are_not_found() {
        let registry = Arc::new(MetricRegistry::new().unwrap());
        let (addr, shutdown) = start(registry, "/portage").await;

        let response = reqwest::get(format!("http://{}/metrics", addr)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        let response = reqwest::get(format!("http://{}/portage", addr)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_serve_returns_after_shutdown() {
        let registry = Arc::new(MetricRegistry::new().unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = CancellationToken::new();
        let server = tokio::spawn(serve(listener, router(registry, "/metrics"), shutdown.clone()));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }
}
