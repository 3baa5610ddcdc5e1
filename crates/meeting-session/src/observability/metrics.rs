//! Metrics for the meeting session layer.
//!
//! All metrics follow Prometheus naming conventions:
//! - `ms_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! - `method`: HTTP verbs used by the gateway (4 values)
//! - `outcome`: `success` or `error`
//! - `kind`: gateway failure classes (4 values)
//! - `reason`: session termination reasons (bounded by `TerminationReason`)
//! - `step`: cleanup steps (bounded by `CleanupStep`)

use metrics::{counter, histogram};
use std::time::Duration;

/// Record a completed gateway request.
///
/// Metrics: `ms_gateway_requests_total`, `ms_gateway_request_duration_seconds`
/// Labels: `method`, `outcome`
pub fn record_gateway_request(method: &str, outcome: &str, duration: Duration) {
    counter!(
        "ms_gateway_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "ms_gateway_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a classified gateway failure.
///
/// Metric: `ms_gateway_failures_total`
/// Labels: `kind`
pub fn record_gateway_failure(kind: &str) {
    counter!("ms_gateway_failures_total", "kind" => kind.to_string()).increment(1);
}

/// Record that a controller reached its terminal state.
///
/// Metric: `ms_session_terminations_total`
/// Labels: `reason`
pub fn record_session_terminated(reason: &str) {
    counter!("ms_session_terminations_total", "reason" => reason.to_string()).increment(1);
}

/// Record a teardown step that failed and was skipped.
///
/// Metric: `ms_cleanup_step_failures_total`
/// Labels: `step`
pub fn record_cleanup_step_failure(step: &str) {
    counter!("ms_cleanup_step_failures_total", "step" => step.to_string()).increment(1);
}

/// Record a corrupted session entry discarded by the store.
///
/// Metric: `ms_store_corrupt_entries_total`
pub fn record_store_corrupt_entry() {
    counter!("ms_store_corrupt_entries_total").increment(1);
}
