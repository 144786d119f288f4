//! Prometheus metrics for the client core.
//!
//! This module provides metrics for:
//! - Query coordinators (requests issued, applied, discarded, failed)
//! - The REST client (requests by endpoint and outcome, latency)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Coordinator Metrics
// =============================================================================

/// Page fetches issued, by source and kind.
pub static FETCHES_ISSUED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bdtheque_fetches_issued_total", "Total page fetches issued"),
        &["source", "kind"], // kind: "initial", "search", "sort", "next_page"
    )
    .unwrap()
});

/// Page fetches whose result was applied to the visible result set.
pub static FETCHES_APPLIED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bdtheque_fetches_applied_total",
            "Total page fetches applied to the result set",
        ),
        &["source"],
    )
    .unwrap()
});

/// Responses dropped because a newer intent superseded them.
pub static STALE_RESPONSES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bdtheque_stale_responses_total",
            "Total responses discarded as stale",
        ),
        &["source"],
    )
    .unwrap()
});

/// Failed page fetches, by whether they were appending.
pub static FETCH_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bdtheque_fetch_failures_total", "Total failed page fetches"),
        &["source", "append"],
    )
    .unwrap()
});

/// Debounced searches cancelled by further typing.
pub static DEBOUNCES_SUPERSEDED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bdtheque_debounces_superseded_total",
            "Total scheduled searches superseded before firing",
        ),
        &["source"],
    )
    .unwrap()
});

// =============================================================================
// REST Client Metrics
// =============================================================================

/// HTTP requests by endpoint and result.
pub static API_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bdtheque_api_requests_total", "Total backend API requests"),
        &["endpoint", "result"], // result: "success", "error"
    )
    .unwrap()
});

/// HTTP request duration in seconds.
pub static API_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "bdtheque_api_request_duration_seconds",
            "Duration of backend API requests",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Coordinator
        Box::new(FETCHES_ISSUED.clone()),
        Box::new(FETCHES_APPLIED.clone()),
        Box::new(STALE_RESPONSES.clone()),
        Box::new(FETCH_FAILURES.clone()),
        Box::new(DEBOUNCES_SUPERSEDED.clone()),
        // REST client
        Box::new(API_REQUESTS.clone()),
        Box::new(API_REQUEST_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        FETCHES_ISSUED.with_label_values(&["test", "initial"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "bdtheque_fetches_issued_total"));
    }
}
