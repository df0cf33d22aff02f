//! Metrics collection and exposition.
//!
//! # Metrics
//! - `searoute_requests_total` (counter): route requests by status
//! - `searoute_request_duration_seconds` (histogram): handler latency
//! - `searoute_cache_hits_total` / `searoute_cache_misses_total` (counters)
//! - `searoute_cache_entries` (gauge): entries held by this worker
//! - `searoute_rate_limited_total` (counter): admissions rejected
//! - `searoute_computation_duration_seconds` (histogram): engine latency
//! - `searoute_computation_failures_total` (counter)
//! - `searoute_worker_restarts_total` (counter, supervisor only)
//!
//! Every process keeps its own registry; without an installed recorder the
//! macros are no-ops.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start: Instant) {
    counter!("searoute_requests_total", "status" => status.to_string()).increment(1);
    histogram!("searoute_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_cache_hit() {
    counter!("searoute_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    counter!("searoute_cache_misses_total").increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("searoute_cache_entries").set(entries as f64);
}

pub fn record_rate_limited() {
    counter!("searoute_rate_limited_total").increment(1);
}

pub fn record_computation(elapsed: Duration, success: bool) {
    histogram!("searoute_computation_duration_seconds").record(elapsed.as_secs_f64());
    if !success {
        counter!("searoute_computation_failures_total").increment(1);
    }
}

pub fn record_worker_restart(slot: usize) {
    counter!("searoute_worker_restarts_total", "slot" => slot.to_string()).increment(1);
}
