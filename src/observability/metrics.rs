//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): dispatches by method, service, status
//! - `gateway_request_duration_seconds` (histogram): dispatch latency
//! - `gateway_service_health` (gauge): 1=healthy, 0=unhealthy
//! - `gateway_health_probes_total` (counter): probes by service, outcome
//! - `gateway_registered_services` (gauge): registry size

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatch outcome.
pub fn record_request(method: &str, service: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "service" => service.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "service" => service.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one health probe result.
pub fn record_probe(service: &str, healthy: bool) {
    let outcome = if healthy { "healthy" } else { "unhealthy" };
    metrics::counter!(
        "gateway_health_probes_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    metrics::gauge!("gateway_service_health", "service" => service.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

/// Zero the health gauge of a service that left the registry.
pub fn clear_service_health(service: &str) {
    metrics::gauge!("gateway_service_health", "service" => service.to_string()).set(0.0);
}

pub fn set_registered_services(count: usize) {
    metrics::gauge!("gateway_registered_services").set(count as f64);
}
