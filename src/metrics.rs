//! Prometheus metrics for request and database probe monitoring.
//!
//! This module provides metrics for:
//! - HTTP request latency and volume per endpoint
//! - Database probe latency
//! - Database probe failures

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::db::DbProbe;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// Database probe latency metric name.
pub const METRIC_DB_PROBE_LATENCY: &str = "db_probe_latency_ms";
/// Database probe failures counter metric name.
pub const METRIC_DB_PROBE_FAILURES: &str = "db_probe_failures_total";

/// Install the Prometheus recorder and register metric descriptions.
///
/// Call this once at startup; the returned handle renders `/metrics`.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Initialize all metric descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_DB_PROBE_LATENCY,
        "Database probe round trip in milliseconds, including pool acquisition"
    );

    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests served");
    describe_counter!(
        METRIC_DB_PROBE_FAILURES,
        "Total number of database probes that failed"
    );

    debug!("Metrics initialized");
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint.to_string()).record(latency_ms);
}

/// Increment HTTP requests counter.
pub fn inc_http_requests(endpoint: &str) {
    counter!(METRIC_HTTP_REQUESTS, "endpoint" => endpoint.to_string()).increment(1);
}

/// Increment database probe failures counter.
pub fn inc_db_probe_failures(probe: DbProbe) {
    let label: &'static str = probe.into();
    counter!(METRIC_DB_PROBE_FAILURES, "probe" => label).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
    probe: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric and probe label.
    pub fn new(metric_name: &'static str, probe: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
            probe,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name, "probe" => self.probe).record(latency_ms);
    }
}

/// Create a latency timer for a database probe.
pub fn timer_db_probe(probe: DbProbe) -> LatencyTimer {
    LatencyTimer::new(METRIC_DB_PROBE_LATENCY, probe.into())
}
