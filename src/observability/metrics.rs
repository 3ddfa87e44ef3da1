//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): forwarded requests by path kind, status
//! - `proxy_rate_limited_total` (counter): rejected admissions
//! - `proxy_upstream_errors_total` (counter): failed upstream attempts

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed forwarded request.
/// `kind` is "html" for buffered-rewrite responses, "passthrough" otherwise.
pub fn record_request(kind: &'static str, status: u16) {
    metrics::counter!(
        "proxy_requests_total",
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a rejected admission.
pub fn record_rate_limited() {
    metrics::counter!("proxy_rate_limited_total").increment(1);
}

/// Record an upstream attempt that failed before a response arrived.
pub fn record_upstream_error() {
    metrics::counter!("proxy_upstream_errors_total").increment(1);
}
