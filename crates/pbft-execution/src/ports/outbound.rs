//! Driven ports (Outbound dependencies)

use crate::domain::{
    ExecutorError, PublishError, SigningError, TransportError, ViewChangeSignal,
};
use async_trait::async_trait;
use shared_types::{ExecuteRequest, ExecuteResponse, ExecutionResult, PeerId};

/// Runs a request's function.
///
/// Implementations need not be deterministic across replicas; each replica
/// reports its own result.
#[async_trait]
pub trait WorkloadExecutor: Send + Sync {
    async fn execute_function(
        &self,
        request_id: &str,
        request: &ExecuteRequest,
    ) -> Result<ExecutionResult, ExecutorError>;
}

/// Point-to-point delivery to another replica.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn send(
        &self,
        target: &PeerId,
        message: &ExecuteResponse,
        protocol: &str,
    ) -> Result<(), TransportError>;
}

/// Cluster-wide publish channel used by the primary.
#[async_trait]
pub trait ClusterPublisher: Send + Sync {
    /// Returns the number of receivers.
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<usize, PublishError>;
}

/// Signs result messages with the replica's identity key.
pub trait ResultSigner: Send + Sync {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SigningError>;

    /// This replica's peer identity.
    fn identity(&self) -> PeerId;
}

/// Receives the liveness timer's view-change request.
///
/// Called from the timer task; must not block.
pub trait ViewChangeTrigger: Send + Sync {
    fn request_view_change(&self, signal: ViewChangeSignal);
}

/// Side effect run after each execution.
///
/// Hooks run in registration order. A failing or panicking hook is logged
/// and skipped.
pub trait PostProcessor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "post-processor"
    }

    fn process(
        &self,
        request_id: &str,
        origin: &PeerId,
        payload: &ExecuteRequest,
        result: &ExecutionResult,
    ) -> Result<(), String>;
}
