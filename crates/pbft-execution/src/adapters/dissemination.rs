//! Result dissemination
//!
//! The primary of the current view publishes signed results on the cluster
//! channel; every other replica sends its result to the primary.

use crate::config::ReplicaConfig;
use crate::domain::{primary_for_view, ReplicaError, ReplicaResult, ResultSink};
use crate::metrics;
use crate::ports::{ClusterPublisher, PeerTransport};
use shared_types::{ExecuteResponse, PeerId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes signed results to the right sink.
pub struct ResultDisseminator<T: PeerTransport, P: ClusterPublisher> {
    transport: Arc<T>,
    publisher: Arc<P>,
    result_channel: String,
    protocol_id: String,
}

impl<T: PeerTransport, P: ClusterPublisher> ResultDisseminator<T, P> {
    pub fn new(transport: Arc<T>, publisher: Arc<P>, config: &ReplicaConfig) -> Self {
        Self {
            transport,
            publisher,
            result_channel: config.result_channel.clone(),
            protocol_id: config.protocol_id.clone(),
        }
    }

    /// Sink for a result produced by `identity` in `view`.
    ///
    /// A replica that is primary, or that has no replica set to pick a
    /// primary from, broadcasts.
    pub fn route(&self, identity: &PeerId, view: u64, replicas: &[PeerId]) -> ResultSink {
        match primary_for_view(view, replicas) {
            Some(primary) if primary != identity => ResultSink::PointToPoint {
                primary: primary.clone(),
                protocol: self.protocol_id.clone(),
            },
            _ => ResultSink::ClusterBroadcast {
                channel: self.result_channel.clone(),
            },
        }
    }

    /// Deliver `message` to `sink`.
    pub async fn disseminate(
        &self,
        sink: &ResultSink,
        message: &ExecuteResponse,
    ) -> ReplicaResult<()> {
        let outcome = match sink {
            ResultSink::ClusterBroadcast { channel } => {
                self.broadcast(channel, message).await
            }
            ResultSink::PointToPoint { primary, protocol } => {
                self.send_to_primary(primary, protocol, message).await
            }
        };

        metrics::record_dissemination(sink.label(), outcome.is_ok());
        outcome
    }

    async fn broadcast(&self, channel: &str, message: &ExecuteResponse) -> ReplicaResult<()> {
        let payload = serde_json::to_vec(message)?;
        let receivers = self
            .publisher
            .publish(channel, payload)
            .await
            .map_err(|e| ReplicaError::Dissemination {
                target: message.pbft.replica.clone(),
                request_id: message.request_id.clone(),
                reason: format!("publish on {channel} failed: {e}"),
            })?;

        info!(
            request_id = %message.request_id,
            channel,
            receivers,
            "Result published on cluster channel"
        );
        Ok(())
    }

    async fn send_to_primary(
        &self,
        primary: &PeerId,
        protocol: &str,
        message: &ExecuteResponse,
    ) -> ReplicaResult<()> {
        if let Err(e) = self.transport.send(primary, message, protocol).await {
            warn!(
                request_id = %message.request_id,
                primary = %primary,
                error = %e,
                "Could not send result to primary"
            );
            return Err(ReplicaError::Dissemination {
                target: primary.clone(),
                request_id: message.request_id.clone(),
                reason: e.to_string(),
            });
        }

        debug!(request_id = %message.request_id, primary = %primary, "Result sent to primary");
        Ok(())
    }
}
