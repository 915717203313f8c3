// Sigwatch Exporter - Poll loop and Prometheus exporter
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! HTTP endpoints
//!
//! `/metrics` serves the Prometheus registry; `/reports` serves the latest
//! batch as the same JSON array `once` prints.

use crate::error::{ExporterError, Result};
use crate::metrics::encode_metrics;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sigwatch::ReportBatch;
use sigwatch_poller::CancellationToken;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

/// State shared across handlers
pub struct AppState {
    latest: RwLock<Option<ReportBatch>>,
    cycles: AtomicU64,
    start_time: Instant,
    source: &'static str,
    device_count: usize,
}

impl AppState {
    pub fn new(source: &'static str, device_count: usize) -> Self {
        Self {
            latest: RwLock::new(None),
            cycles: AtomicU64::new(0),
            start_time: Instant::now(),
            source,
            device_count,
        }
    }

    /// Replace the latest batch
    pub fn publish(&self, batch: ReportBatch) {
        let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
        *latest = Some(batch);
        self.cycles.fetch_add(1, Ordering::SeqCst);
    }

    /// Copy of the latest batch
    pub fn latest(&self) -> Option<ReportBatch> {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Completed cycles
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/status", get(status_handler))
        .route("/reports", get(reports_handler))
        .with_state(state)
}

/// Bind the HTTP listener
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ExporterError::Bind { addr, source })?;

    info!("Starting server on http://{}", addr);
    info!("Metrics endpoint: http://{}/metrics", addr);
    Ok(listener)
}

/// Serve until the token fires
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    cancel: CancellationToken,
) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;
    Ok(())
}

/// Root handler - shows a simple HTML page.
async fn root_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Sigwatch Exporter</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
        h1 { color: #2c3e50; }
        a { color: #3498db; text-decoration: none; }
        .endpoints { background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0; }
        .endpoint { margin: 10px 0; }
        code { background: #e9ecef; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Sigwatch Exporter</h1>
    <p>Signal-quality telemetry for encoders, lasers and cameras.</p>

    <div class="endpoints">
        <h2>Endpoints</h2>
        <div class="endpoint"><a href="/metrics">/metrics</a> - Prometheus metrics</div>
        <div class="endpoint"><a href="/health">/health</a> - Health check</div>
        <div class="endpoint"><a href="/ready">/ready</a> - Ready once a cycle has completed</div>
        <div class="endpoint"><a href="/status">/status</a> - Status information (JSON)</div>
        <div class="endpoint"><a href="/reports">/reports</a> - Latest reports (JSON)</div>
    </div>

    <h2>Metrics</h2>
    <ul>
        <li><code>sigwatch_device_status</code> - 0=OK, 1=WARNING, 2=CRITICAL, 3=UNREACHABLE, 4=INVALID</li>
        <li><code>sigwatch_device_value</code> - Variance %, drift degrees or bitrate Mbps</li>
        <li><code>sigwatch_device_absent_samples</code> - Absent samples in the latest window</li>
        <li><code>sigwatch_cycles_total</code> - Completed poll cycles</li>
        <li><code>sigwatch_cycle_duration_seconds</code> - Latest cycle duration</li>
        <li><code>sigwatch_absent_samples_total</code> - Absent samples across all cycles</li>
        <li><code>sigwatch_reports</code> - Reports per status in the latest cycle</li>
    </ul>
</body>
</html>"#,
    )
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler() -> Response {
    match encode_metrics() {
        Ok(metrics) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; charset=utf-8")],
            metrics,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness check handler.
async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.cycles() > 0 {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Waiting for first cycle")
    }
}

/// Status information response.
#[derive(Serialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    source: &'static str,
    devices: usize,
    cycles: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_cycle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<sigwatch::BatchSummary>,
}

/// Status handler - returns JSON status information.
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let latest = state.latest();
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        source: state.source,
        devices: state.device_count,
        cycles: state.cycles(),
        last_cycle: latest.as_ref().map(|b| b.captured_at.to_rfc3339()),
        summary: latest.map(|b| b.summary),
    })
}

/// Latest reports, or 503 before the first cycle.
async fn reports_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.latest() {
        Some(batch) => Json(batch.reports).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "No cycle completed yet").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sigwatch::{Device, DeviceKind, ReportBuilder, Status};

    #[test]
    fn test_publish_counts_cycles() {
        let state = AppState::new("simulated", 1);
        assert_eq!(state.cycles(), 0);

        let device = Device::new("UPS-01", "192.168.1.50", DeviceKind::Generic)
            .with_metric("load", "1.3.6.1.2.1.33.1.4.4.1.5.1");
        let report = ReportBuilder::new(&device, Utc::now())
            .metric("load", Some("42".to_string()))
            .build(Status::Ok);
        state.publish(ReportBatch::new(Utc::now(), vec![report]));

        assert_eq!(state.cycles(), 1);
        assert_eq!(state.latest().map(|b| b.len()), Some(1));
    }
}
