//! Prometheus metrics for replica execution.
//!
//! All metrics follow the naming convention: `rp_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., requests_journaled_total)
//! - **Gauge**: Value that can go up or down (e.g., pending_requests)
//! - **Histogram**: Distribution of values (e.g., execution_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // INTAKE
    // =========================================================================

    /// Requests whose digest was new when submitted
    pub static ref REQUESTS_JOURNALED: Counter = Counter::new(
        "rp_intake_requests_journaled_total",
        "Total number of distinct requests added to the journal"
    ).expect("metric creation failed");

    /// Submissions whose digest was already journaled
    pub static ref REQUESTS_DUPLICATE: Counter = Counter::new(
        "rp_intake_requests_duplicate_total",
        "Total number of submissions for an already journaled digest"
    ).expect("metric creation failed");

    /// Requests journaled but not yet executed
    pub static ref PENDING_REQUESTS: Gauge = Gauge::new(
        "rp_intake_pending_requests",
        "Number of journaled requests awaiting execution"
    ).expect("metric creation failed");

    // =========================================================================
    // COMMIT
    // =========================================================================

    /// Commit calls by outcome
    pub static ref COMMITS: CounterVec = CounterVec::new(
        Opts::new("rp_commit_total", "Commit calls by outcome"),
        &["outcome"]  // executed/already_executed/sequence_gap/out_of_order/unknown_request
    ).expect("metric creation failed");

    /// Highest executed sequence number
    pub static ref LAST_EXECUTED_SEQUENCE: Gauge = Gauge::new(
        "rp_commit_last_executed_sequence",
        "Sequence number of the most recently executed request"
    ).expect("metric creation failed");

    // =========================================================================
    // EXECUTION
    // =========================================================================

    /// Executor invocation duration
    pub static ref EXECUTION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "rp_execution_duration_seconds",
            "Time spent inside the workload executor"
        ).buckets(exponential_buckets(0.001, 2.0, 16).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Executions that did not complete normally
    pub static ref EXECUTOR_FAILURES: CounterVec = CounterVec::new(
        Opts::new("rp_execution_failures_total", "Executions that failed, timed out or were cancelled"),
        &["code"]
    ).expect("metric creation failed");

    /// Post-processing hook failures
    pub static ref HOOK_FAILURES: Counter = Counter::new(
        "rp_execution_hook_failures_total",
        "Post-processing hooks that returned an error or panicked"
    ).expect("metric creation failed");

    // =========================================================================
    // DISSEMINATION
    // =========================================================================

    /// Result messages routed, by sink and result
    pub static ref DISSEMINATIONS: CounterVec = CounterVec::new(
        Opts::new("rp_dissemination_messages_total", "Result messages disseminated"),
        &["sink", "result"]  // sink: cluster_broadcast/point_to_point, result: ok/failed
    ).expect("metric creation failed");

    // =========================================================================
    // LIVENESS
    // =========================================================================

    /// Liveness timer expiries
    pub static ref VIEW_CHANGE_SIGNALS: Counter = Counter::new(
        "rp_liveness_view_change_signals_total",
        "Liveness timer expiries that requested a view change"
    ).expect("metric creation failed");
}

/// Handle to the registered metrics.
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// Registry the metrics are registered in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; metrics already registered are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Intake
        Box::new(REQUESTS_JOURNALED.clone()),
        Box::new(REQUESTS_DUPLICATE.clone()),
        Box::new(PENDING_REQUESTS.clone()),
        // Commit
        Box::new(COMMITS.clone()),
        Box::new(LAST_EXECUTED_SEQUENCE.clone()),
        // Execution
        Box::new(EXECUTION_DURATION.clone()),
        Box::new(EXECUTOR_FAILURES.clone()),
        Box::new(HOOK_FAILURES.clone()),
        // Dissemination
        Box::new(DISSEMINATIONS.clone()),
        // Liveness
        Box::new(VIEW_CHANGE_SIGNALS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_twice() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_counter_increment() {
        REQUESTS_JOURNALED.inc();
        assert!(REQUESTS_JOURNALED.get() >= 1.0);
    }

    #[test]
    fn test_labelled_counter() {
        COMMITS.with_label_values(&["executed"]).inc();
        assert!(COMMITS.with_label_values(&["executed"]).get() >= 1.0);
    }

    #[test]
    fn test_encode_contains_registered_metric() {
        register_metrics().unwrap();
        VIEW_CHANGE_SIGNALS.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("rp_liveness_view_change_signals_total"));
    }

    #[test]
    fn test_histogram_timer() {
        let before = EXECUTION_DURATION.get_sample_count();
        {
            let _timer = HistogramTimer::new(&EXECUTION_DURATION);
        }
        assert!(EXECUTION_DURATION.get_sample_count() > before);
    }
}
