//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by method, status, route
//! - `edge_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Recording is unconditional and cheap; without an installed
//!   exporter the macros are no-ops
//! - The Prometheus endpoint only starts when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter, listening on `addr` for scrapes.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    metrics::counter!("edge_requests_total", &labels).increment(1);
    metrics::histogram!("edge_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}
