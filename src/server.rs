//! HTTP server exposing the exporter metrics for scraping.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::{net::TcpListener, sync::watch};
use tracing::{error, info};

use crate::metrics::ExporterMetrics;

pub const METRICS_PATH: &str = "/metrics";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

pub fn router(metrics: ExporterMetrics) -> Router {
    Router::new()
        .route(METRICS_PATH, get(scrape))
        .with_state(metrics)
}

async fn scrape(State(metrics): State<ExporterMetrics>) -> Response {
    match metrics.encode() {
        Ok(body) => ([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Serves until `shutdown` changes or its sender is dropped.
pub async fn serve(
    listener: TcpListener,
    metrics: ExporterMetrics,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, path = METRICS_PATH, "server started");
    }

    axum::serve(listener, router(metrics))
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await
}
