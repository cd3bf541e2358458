//! Client requests as the replica journals them.

use super::errors::{ReplicaError, ReplicaResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_crypto::content_digest;
use shared_types::{Digest, ExecuteRequest, PeerId};
use uuid::Uuid;

/// A client request: identity, provenance and the work to run.
///
/// Field order is part of the digest; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub origin: PeerId,
    pub execute: ExecuteRequest,
}

impl Request {
    /// Build a request, assigning a fresh UUID when `id` is empty.
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        origin: PeerId,
        execute: ExecuteRequest,
    ) -> Self {
        let mut id = id.into();
        if id.is_empty() {
            id = Uuid::new_v4().to_string();
        }

        Self {
            id,
            timestamp,
            origin,
            execute,
        }
    }

    /// Reject requests the executor could never run.
    pub fn validate(&self) -> ReplicaResult<()> {
        if self.execute.function_id.trim().is_empty() {
            return Err(ReplicaError::InvalidRequest(format!(
                "request {} has no function id",
                self.id
            )));
        }

        if let Some(position) = self
            .execute
            .parameters
            .iter()
            .position(|p| p.name.trim().is_empty())
        {
            return Err(ReplicaError::InvalidRequest(format!(
                "request {} has an unnamed parameter at position {}",
                self.id, position
            )));
        }

        Ok(())
    }

    /// SHA-256 over the JSON encoding of the request.
    pub fn digest(&self) -> ReplicaResult<Digest> {
        let encoded = serde_json::to_vec(self)?;
        Ok(content_digest(&encoded))
    }
}
