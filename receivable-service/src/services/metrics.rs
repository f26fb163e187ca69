//! Prometheus metrics for receivable-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "receivable_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Settlement counter by outcome.
pub static SETTLEMENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivable_settlements_total",
        "Total number of settlement attempts by outcome",
        &["outcome"] // applied, rejected
    )
    .expect("Failed to register settlements_total")
});

/// Report export counter by outcome.
pub static EXPORTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivable_exports_total",
        "Total number of report exports by outcome",
        &["outcome"] // ok, failed
    )
    .expect("Failed to register exports_total")
});

/// Aggregate cache refresh ticks by outcome.
pub static CACHE_REFRESH_TICKS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivable_cache_refresh_ticks_total",
        "Aggregate cache refresh ticks by outcome",
        &["outcome"] // ok, failed
    )
    .expect("Failed to register cache_refresh_ticks")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivable_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&SETTLEMENTS_TOTAL);
    Lazy::force(&EXPORTS_TOTAL);
    Lazy::force(&CACHE_REFRESH_TICKS);
    Lazy::force(&ERRORS_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
