//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define delivery metrics (requests, latency, transform time)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `adaptive_webp_requests_total` (counter): requests by method, status
//! - `adaptive_webp_request_duration_seconds` (histogram): end-to-end latency
//! - `adaptive_webp_transform_duration_seconds` (histogram): codec time by output format
//! - `adaptive_webp_config_reloads_total` (counter): reloads by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels stay low-cardinality: no paths or hosts, and methods outside
//!   GET/HEAD collapse to `other`

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Bounded label for a request method. Clients choose the method token, so
/// anything the server does not serve shares one series.
pub fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::HEAD => "HEAD",
        _ => "other",
    }
}

/// Record a completed request.
pub fn record_request(method: &Method, status: u16, start: Instant) {
    let method = method_label(method);
    let status = status.to_string();
    counter!("adaptive_webp_requests_total", "method" => method, "status" => status.clone())
        .increment(1);
    histogram!("adaptive_webp_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record codec time for one transform.
pub fn record_transform(format: &'static str, start: Instant) {
    histogram!("adaptive_webp_transform_duration_seconds", "format" => format)
        .record(start.elapsed().as_secs_f64());
}

/// Record a configuration reload attempt.
pub fn record_reload(outcome: &'static str) {
    counter!("adaptive_webp_config_reloads_total", "outcome" => outcome).increment(1);
}
