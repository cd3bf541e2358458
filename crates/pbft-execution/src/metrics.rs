//! # Pipeline Metrics
//!
//! Thin recording helpers over the `replica-telemetry` registry.
//!
//! ## Usage
//!
//! Enabled by the default `metrics` feature:
//! ```toml
//! pbft-execution = { path = "...", default-features = false }  # no metrics
//! ```
//!
//! ## Metrics Recorded
//!
//! - `rp_intake_requests_journaled_total` / `rp_intake_requests_duplicate_total`
//! - `rp_intake_pending_requests`
//! - `rp_commit_total{outcome}` and `rp_commit_last_executed_sequence`
//! - `rp_execution_duration_seconds`, `rp_execution_failures_total{code}`
//! - `rp_execution_hook_failures_total`
//! - `rp_dissemination_messages_total{sink,result}`
//! - `rp_liveness_view_change_signals_total`

#[cfg(feature = "metrics")]
use replica_telemetry::metrics::{
    COMMITS, DISSEMINATIONS, EXECUTION_DURATION, EXECUTOR_FAILURES, HOOK_FAILURES,
    LAST_EXECUTED_SEQUENCE, PENDING_REQUESTS, REQUESTS_DUPLICATE, REQUESTS_JOURNALED,
    VIEW_CHANGE_SIGNALS,
};

/// Record a submission and the resulting pending-set size
#[cfg(feature = "metrics")]
pub fn record_submitted(newly_journaled: bool, pending: usize) {
    if newly_journaled {
        REQUESTS_JOURNALED.inc();
    } else {
        REQUESTS_DUPLICATE.inc();
    }
    PENDING_REQUESTS.set(pending as f64);
}

/// Record a commit call by outcome label
#[cfg(feature = "metrics")]
pub fn record_commit(outcome: &str) {
    COMMITS.with_label_values(&[outcome]).inc();
}

/// Record a completed execution
#[cfg(feature = "metrics")]
pub fn record_executed(sequence: u64, pending: usize) {
    LAST_EXECUTED_SEQUENCE.set(sequence as f64);
    PENDING_REQUESTS.set(pending as f64);
}

/// Record time spent in the executor
#[cfg(feature = "metrics")]
pub fn record_execution_duration(seconds: f64) {
    EXECUTION_DURATION.observe(seconds);
}

/// Record an execution that did not succeed
#[cfg(feature = "metrics")]
pub fn record_executor_failure(code: &str) {
    EXECUTOR_FAILURES.with_label_values(&[code]).inc();
}

/// Record a failed post-processing hook
#[cfg(feature = "metrics")]
pub fn record_hook_failure() {
    HOOK_FAILURES.inc();
}

/// Record a dissemination attempt
#[cfg(feature = "metrics")]
pub fn record_dissemination(sink: &str, ok: bool) {
    let result = if ok { "ok" } else { "failed" };
    DISSEMINATIONS.with_label_values(&[sink, result]).inc();
}

/// Record a liveness timer expiry
#[cfg(feature = "metrics")]
pub fn record_view_change_signal() {
    VIEW_CHANGE_SIGNALS.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_submitted(_newly_journaled: bool, _pending: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_commit(_outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_executed(_sequence: u64, _pending: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_execution_duration(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_executor_failure(_code: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_hook_failure() {}

#[cfg(not(feature = "metrics"))]
pub fn record_dissemination(_sink: &str, _ok: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_view_change_signal() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_does_not_panic() {
        record_submitted(true, 1);
        record_submitted(false, 1);
        record_commit("executed");
        record_executed(1, 0);
        record_execution_duration(0.01);
        record_executor_failure("500");
        record_hook_failure();
        record_dissemination("cluster_broadcast", true);
        record_view_change_signal();
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_commit_counter_moves() {
        let before = COMMITS.with_label_values(&["sequence_gap"]).get();
        record_commit("sequence_gap");
        assert!(COMMITS.with_label_values(&["sequence_gap"]).get() > before);
    }
}
