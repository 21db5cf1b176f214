//! Prometheus metrics for core components.
//!
//! This module provides metrics for the bulk item processor. The server
//! registers them alongside its HTTP metrics.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Processor Metrics
// =============================================================================

/// Processing runs total by result.
pub static PROCESS_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("itemflow_process_runs_total", "Total bulk processing runs"),
        &["result"], // "completed", "failed", "abandoned"
    )
    .unwrap()
});

/// Processing run duration in seconds.
pub static PROCESS_RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "itemflow_process_run_duration_seconds",
            "Duration of bulk processing runs",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

/// Items marked processed and saved.
pub static ITEMS_PROCESSED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "itemflow_items_processed_total",
        "Total items marked processed",
    )
    .unwrap()
});

/// Ids dispatched for processing that had no stored item.
pub static ITEMS_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "itemflow_items_skipped_total",
        "Total ids skipped because no item was stored",
    )
    .unwrap()
});

/// All core metrics, for registration with a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PROCESS_RUNS.clone()),
        Box::new(PROCESS_RUN_DURATION.clone()),
        Box::new(ITEMS_PROCESSED.clone()),
        Box::new(ITEMS_SKIPPED.clone()),
    ]
}
