//! Prometheus metrics for the stubboard data plane.
//!
//! Tracks mock execution activity, rate limiting and the write-behind
//! persistence pipeline.

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Total number of mock executions, by whether a rule fired
    pub static ref EXECUTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "stubboard_executions_total",
        "Total number of mock executions",
        &["matched"]  // matched: true|false
    )
    .unwrap();

    /// Requests rejected by the fixed-window rate limiter
    pub static ref RATE_LIMITED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "stubboard_rate_limited_total",
        "Requests rejected by the rate limiter",
        &["category"]  // category: board_creation|mock_execution|general
    )
    .unwrap();

    /// Capture records recycled in place instead of appended
    pub static ref CAPTURE_RECYCLES_TOTAL: IntCounter = register_int_counter!(
        "stubboard_capture_recycles_total",
        "Capture records recycled in place by the webhook cache"
    )
    .unwrap();

    /// Events flushed to durable storage by the drain tasks
    pub static ref EVENTS_FLUSHED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "stubboard_events_flushed_total",
        "Domain events flushed by the batch persistence scheduler",
        &["entity", "op"]  // entity: board|mock_rule|webhook, op: create|update|delete
    )
    .unwrap();

    /// Drain batches dropped after a persistence failure
    pub static ref BATCHES_DROPPED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "stubboard_batches_dropped_total",
        "Drain batches dropped after a persistence failure",
        &["entity"]
    )
    .unwrap();
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!("failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_includes_registered_metrics() {
        EXECUTIONS_TOTAL.with_label_values(&["true"]).inc();
        let text = gather();
        assert!(text.contains("stubboard_executions_total"));
    }
}
