//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Sync runs (outcomes, durations, per-record counters)
//! - Upstream catalog requests
//! - Card search

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Sync Metrics
// =============================================================================

/// Sync runs total by type and result.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("binder_sync_runs_total", "Total sync runs"),
        &["sync_type", "result"], // result: "success", "failed"
    )
    .unwrap()
});

/// Sync run duration in seconds.
pub static SYNC_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("binder_sync_duration_seconds", "Duration of sync runs")
            .buckets(vec![0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 1800.0]),
        &["sync_type"],
    )
    .unwrap()
});

/// Records written per sync by outcome.
pub static SYNC_RECORDS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "binder_sync_records_total",
            "Total records seen by sync runs",
        ),
        &["sync_type", "outcome"], // outcome: "created", "updated", "skipped", "error"
    )
    .unwrap()
});

// =============================================================================
// Upstream Metrics
// =============================================================================

/// Upstream catalog requests total by final status.
pub static UPSTREAM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "binder_upstream_requests_total",
            "Total upstream catalog requests",
        ),
        &["status"], // "success", "not_found", "rate_limited", "unavailable", "error"
    )
    .unwrap()
});

// =============================================================================
// Search Metrics
// =============================================================================

/// Card searches total.
pub static SEARCH_QUERIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("binder_search_queries_total", "Total card searches").unwrap()
});

/// Results returned per search.
pub static SEARCH_RESULTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "binder_search_results",
            "Number of card identifiers returned per search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0]),
    )
    .unwrap()
});

/// Searches that degraded to the substring fallback.
pub static SEARCH_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "binder_search_fallbacks_total",
        "Total searches served by the substring fallback",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Sync
        Box::new(SYNC_RUNS.clone()),
        Box::new(SYNC_DURATION.clone()),
        Box::new(SYNC_RECORDS.clone()),
        // Upstream
        Box::new(UPSTREAM_REQUESTS.clone()),
        // Search
        Box::new(SEARCH_QUERIES.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        Box::new(SEARCH_FALLBACKS.clone()),
    ]
}
