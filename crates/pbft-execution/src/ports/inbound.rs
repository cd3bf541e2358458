//! Driving ports (Inbound API)

use crate::domain::{CommitOutcome, ExecutionContext, ReplicaResult, SubmitAck};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{Digest, ExecuteRequest, ExecuteResponse, PeerId};

/// Replica request pipeline API
///
/// `submit` is called by the request relay when a client request arrives;
/// `commit` is called by the agreement layer once a request is ordered.
#[async_trait]
pub trait ReplicaApi: Send + Sync {
    /// Journal a client request.
    ///
    /// An empty `request_id` is replaced with a fresh UUID. Submitting the
    /// same request twice journals it once.
    async fn submit(
        &self,
        origin: PeerId,
        request_id: String,
        timestamp: DateTime<Utc>,
        payload: ExecuteRequest,
    ) -> ReplicaResult<SubmitAck>;

    /// Execute the request with `digest` at `sequence`, if it is next.
    async fn commit(&self, view: u64, sequence: u64, digest: Digest)
        -> ReplicaResult<CommitOutcome>;

    /// As [`commit`](Self::commit), bounding the executor call by `ctx`.
    async fn commit_with(
        &self,
        view: u64,
        sequence: u64,
        digest: Digest,
        ctx: ExecutionContext,
    ) -> ReplicaResult<CommitOutcome>;

    /// Signed response for an executed request.
    async fn cached_result(&self, request_id: &str) -> Option<ExecuteResponse>;

    /// Sequence number of the most recent execution.
    async fn last_executed(&self) -> u64;
}
