//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter and provides the /metrics endpoint handler.
//! Until [`init_metrics`] runs the `metrics` macros are no-ops, which is what
//! the test suites rely on.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// This must be called once at startup before any metrics are recorded.
/// Panics if called more than once.
pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// One finished extraction request. `outcome` is `success`, `validation`,
/// `decode` or a provider error kind.
pub fn record_outcome(outcome: &'static str) {
    counter!("extraction_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_provider_latency(model: &str, elapsed: Duration) {
    histogram!("extraction_provider_latency_seconds", "model" => model.to_string())
        .record(elapsed.as_secs_f64());
}

/// Size of the recompressed JPEG sent upstream.
pub fn record_payload_bytes(bytes: usize) {
    histogram!("extraction_payload_bytes").record(bytes as f64);
}

pub fn record_schema_mismatch() {
    counter!("extraction_schema_mismatch_total").increment(1);
}
