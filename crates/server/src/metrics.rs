//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the itemflow server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Processor pool status (collected dynamically)
//! - Core processing run metrics (registered from `itemflow_core::metrics`)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "itemflow_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("itemflow_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "itemflow_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Processor Pool Metrics (collected dynamically)
// =============================================================================

/// Processor running state (1 = accepting runs, 0 = shut down).
pub static PROCESSOR_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "itemflow_processor_running",
        "Whether the processor accepts runs (1) or is shut down (0)",
    )
    .unwrap()
});

/// Units currently holding a pool slot.
pub static PROCESSOR_POOL_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "itemflow_processor_pool_active",
        "Number of units holding a pool slot",
    )
    .unwrap()
});

/// Units waiting for a pool slot.
pub static PROCESSOR_POOL_QUEUED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "itemflow_processor_pool_queued",
        "Number of units waiting for a pool slot",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Processor pool
    registry
        .register(Box::new(PROCESSOR_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(PROCESSOR_POOL_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(PROCESSOR_POOL_QUEUED.clone()))
        .unwrap();

    // Core metrics (processing runs, items)
    for metric in itemflow_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Update pool gauges from the processor's current status.
pub fn collect_dynamic_metrics(state: &AppState) {
    let status = state.processor().status();
    PROCESSOR_RUNNING.set(if status.running { 1 } else { 0 });
    PROCESSOR_POOL_ACTIVE.set(status.active_units as i64);
    PROCESSOR_POOL_QUEUED.set(status.queued_units as i64);
}

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    // Applied twice: adjacent numeric segments share a slash, so a single
    // pass only rewrites every other one.
    let result = NUMERIC_SEGMENT.replace_all(path, "/{id}$1");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}
