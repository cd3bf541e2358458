//! Error types for the execution pipeline.
//!
//! Benign conditions (duplicate commit, sequence gap, ordering anomaly) are
//! not errors; they are reported through [`CommitOutcome`](super::CommitOutcome).

use shared_types::{Digest, PeerId};
use thiserror::Error;

/// Errors surfaced by [`ReplicaApi`](crate::ports::ReplicaApi) operations.
#[derive(Debug, Error)]
pub enum ReplicaError {
    /// Commit named a digest that was never journaled.
    #[error("Unknown request (digest: {0})")]
    UnknownRequest(Digest),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Could not encode request: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Raised after the sequence already advanced; execution is not undone.
    #[error("Could not sign result for request {request_id}: {source}")]
    Signing {
        request_id: String,
        #[source]
        source: SigningError,
    },

    /// Raised after the sequence already advanced; execution is not undone.
    #[error("Could not send result to {target} (request: {request_id}): {reason}")]
    Dissemination {
        target: PeerId,
        request_id: String,
        reason: String,
    },

    /// The execution task died before reporting. The sequence slot may
    /// already be consumed.
    #[error("Execution of request {request_id} aborted: {reason}")]
    ExecutionAborted { request_id: String, reason: String },
}

/// Result type for replica operations
pub type ReplicaResult<T> = Result<T, ReplicaError>;

/// Failure reported by the workload executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Execution failed: {0}")]
    Failed(String),

    #[error("Executor unavailable: {0}")]
    Unavailable(String),
}

/// Failure sending a message to a peer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Peer not reachable: {0}")]
    Unreachable(PeerId),

    #[error("Could not encode message: {0}")]
    Encoding(String),

    #[error("Connection closed")]
    Closed,
}

/// Failure publishing on the cluster channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("Could not encode message: {0}")]
    Encoding(String),

    #[error("Channel {0} unavailable")]
    Unavailable(String),
}

/// Failure producing a signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("Could not encode signing payload: {0}")]
    Payload(String),

    #[error("Signing key unavailable")]
    KeyUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dissemination_error_display() {
        let err = ReplicaError::Dissemination {
            target: PeerId::new("primary"),
            request_id: "r1".into(),
            reason: "Connection closed".into(),
        };
        assert_eq!(
            err.to_string(),
            "Could not send result to primary (request: r1): Connection closed"
        );
    }

    #[test]
    fn test_unknown_request_shows_digest() {
        let digest = Digest::from_bytes([0xab; 32]);
        let err = ReplicaError::UnknownRequest(digest);
        assert!(err.to_string().contains(&digest.to_hex()));
    }

    #[test]
    fn test_signing_error_keeps_source() {
        let err = ReplicaError::Signing {
            request_id: "r1".into(),
            source: SigningError::KeyUnavailable,
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
