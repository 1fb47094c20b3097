//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): responses by status
//! - `http_request_duration_seconds` (histogram): pipeline latency
//! - `conneg_cache_hits_total` / `conneg_cache_misses_total` (counter)
//! - `proxy_errors_total` (counter): upstream failures
//! - `pipeline_faults_total` (counter): steps that failed, by step name

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!("http_requests_total", "method" => method.to_string(), "status" => status.to_string()).increment(1);
    histogram!("http_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a representation cache lookup.
pub fn record_cache_lookup(hit: bool) {
    if hit {
        counter!("conneg_cache_hits_total").increment(1);
    } else {
        counter!("conneg_cache_misses_total").increment(1);
    }
}

pub fn record_proxy_error() {
    counter!("proxy_errors_total").increment(1);
}

pub fn record_pipeline_fault(step: &'static str) {
    counter!("pipeline_faults_total", "step" => step).increment(1);
}
