//! Executor adapter
//!
//! Wraps the `WorkloadExecutor` port so that every invocation yields an
//! `ExecutionResult`: errors, deadline expiry and cancellation become result
//! codes instead of faults.

use crate::domain::ExecutionContext;
use crate::metrics;
use crate::ports::WorkloadExecutor;
use shared_types::{ExecuteRequest, ExecutionResult, ResultCode};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Runs requests against a [`WorkloadExecutor`].
pub struct ExecutorAdapter<X: WorkloadExecutor> {
    executor: Arc<X>,
}

impl<X: WorkloadExecutor> ExecutorAdapter<X> {
    pub fn new(executor: Arc<X>) -> Self {
        Self { executor }
    }

    /// Execute `payload`, honouring the deadline and cancellation in `ctx`.
    pub async fn run(
        &self,
        request_id: &str,
        payload: &ExecuteRequest,
        ctx: &ExecutionContext,
    ) -> ExecutionResult {
        let started = Instant::now();

        let call = self.executor.execute_function(request_id, payload);
        let bounded = async {
            match ctx.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, call).await.ok(),
                None => Some(call.await),
            }
        };

        let result = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                warn!(request_id, "Execution cancelled");
                ExecutionResult::failure(request_id, ResultCode::Error, "execution cancelled")
            }
            outcome = bounded => match outcome {
                Some(Ok(mut result)) => {
                    if result.request_id != request_id {
                        if !result.request_id.is_empty() {
                            warn!(
                                request_id,
                                reported = %result.request_id,
                                "Executor reported a different request id"
                            );
                        }
                        result.request_id = request_id.to_string();
                    }
                    result
                }
                Some(Err(e)) => {
                    error!(request_id, error = %e, "Execution failed");
                    ExecutionResult::failure(request_id, ResultCode::Error, e.to_string())
                }
                None => {
                    warn!(request_id, "Execution deadline exceeded");
                    ExecutionResult::failure(
                        request_id,
                        ResultCode::Timeout,
                        "execution deadline exceeded",
                    )
                }
            },
        };

        metrics::record_execution_duration(started.elapsed().as_secs_f64());
        if result.code.is_failure() {
            metrics::record_executor_failure(result.code.as_str());
        }

        debug!(request_id, code = %result.code, "Executor returned");
        result
    }
}
