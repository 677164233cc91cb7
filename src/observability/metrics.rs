//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define bridge metrics (requests, latency, upstream health, handlers)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `bridge_requests_total` (counter): client requests by outcome
//! - `bridge_request_duration_seconds` (histogram): end-to-end handler latency
//! - `bridge_upstream_exchange_duration_seconds` (histogram): backend round trips
//! - `bridge_upstream_connects_total` (counter): dial attempts by result
//! - `bridge_active_handlers` (gauge): handlers past the admission gate
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished client request.
pub fn record_request(outcome: &'static str, start: Instant) {
    metrics::counter!("bridge_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("bridge_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one upstream exchange.
pub fn record_exchange(result: &'static str, start: Instant) {
    metrics::histogram!("bridge_upstream_exchange_duration_seconds", "result" => result)
        .record(start.elapsed().as_secs_f64());
}

/// Record an upstream dial attempt.
pub fn record_connect(success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("bridge_upstream_connects_total", "result" => result).increment(1);
}

/// Publish the number of handlers currently holding an admission permit.
pub fn record_active_handlers(count: usize) {
    metrics::gauge!("bridge_active_handlers").set(count as f64);
}
