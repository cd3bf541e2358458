//! # Result Messages
//!
//! The signed result message a replica emits after executing a request.
//!
//! ```text
//! {
//!   "type": "MsgExecuteResponseToPrimary",
//!   "code": "200",
//!   "request_id": "...",
//!   "function_id": "...",
//!   "results": { "<replica>": { "code": ..., "result": {...}, "request_id": ... } },
//!   "pbft": { "view": 0, "request_timestamp": "...", "replica": "<replica>" },
//!   "signature": "<hex>"
//! }
//! ```

use crate::codes::ResultCode;
use crate::entities::PeerId;
use crate::execute::ExecutionResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message type tag for a replica's execution result routed to the primary.
pub const MESSAGE_EXECUTE_RESPONSE_TO_PRIMARY: &str = "MsgExecuteResponseToPrimary";

/// Default protocol tag for point-to-point result delivery.
pub const DEFAULT_PROTOCOL_ID: &str = "/b7s/work/1.0.0";

/// Default cluster-wide channel the primary publishes results on.
pub const DEFAULT_RESULT_CHANNEL: &str = "cluster-primary";

/// Provenance of a result: which replica produced it, in which view, for
/// which client-asserted request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PbftResultInfo {
    pub view: u64,
    pub request_timestamp: DateTime<Utc>,
    pub replica: PeerId,
}

/// Signed execution result message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    #[serde(rename = "type")]
    pub message_type: String,
    pub code: ResultCode,
    pub request_id: String,
    pub function_id: String,
    /// Per-replica result contributions, for later quorum aggregation.
    pub results: BTreeMap<PeerId, ExecutionResult>,
    pub pbft: PbftResultInfo,
    /// Hex signature over [`ExecuteResponse::signing_payload`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
}

impl ExecuteResponse {
    /// Build an unsigned response carrying a single replica's result.
    pub fn new(
        replica: PeerId,
        view: u64,
        request_timestamp: DateTime<Utc>,
        function_id: impl Into<String>,
        result: ExecutionResult,
    ) -> Self {
        let mut results = BTreeMap::new();
        let code = result.code;
        let request_id = result.request_id.clone();
        results.insert(replica.clone(), result);

        Self {
            message_type: MESSAGE_EXECUTE_RESPONSE_TO_PRIMARY.to_string(),
            code,
            request_id,
            function_id: function_id.into(),
            results,
            pbft: PbftResultInfo {
                view,
                request_timestamp,
                replica,
            },
            signature: String::new(),
        }
    }

    /// Bytes covered by the signature: the JSON encoding of the message
    /// with the `signature` field cleared.
    pub fn signing_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut unsigned = self.clone();
        unsigned.signature.clear();
        serde_json::to_vec(&unsigned)
    }

    /// Whether a signature has been attached.
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::RuntimeOutput;

    fn sample() -> ExecuteResponse {
        let result = ExecutionResult {
            code: ResultCode::Ok,
            result: RuntimeOutput {
                stdout: "hello".into(),
                ..Default::default()
            },
            request_id: "r1".into(),
        };
        ExecuteResponse::new(
            PeerId::new("replica-0"),
            3,
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            "fn-1",
            result,
        )
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], MESSAGE_EXECUTE_RESPONSE_TO_PRIMARY);
        assert_eq!(json["code"], "200");
        assert_eq!(json["request_id"], "r1");
        assert_eq!(json["function_id"], "fn-1");
        assert_eq!(json["pbft"]["view"], 3);
        assert_eq!(json["pbft"]["replica"], "replica-0");
        assert_eq!(json["results"]["replica-0"]["result"]["stdout"], "hello");
        assert!(json.get("signature").is_none());
    }

    #[test]
    fn test_signing_payload_ignores_signature() {
        let unsigned = sample();
        let mut signed = sample();
        signed.signature = "deadbeef".into();

        assert!(signed.is_signed());
        assert_eq!(
            unsigned.signing_payload().unwrap(),
            signed.signing_payload().unwrap()
        );
    }
}
