//! In-memory peer transport
//!
//! Connects replicas living in one process. Each registered peer gets an
//! unbounded inbox; sending to an unregistered or dropped peer fails.

use crate::domain::TransportError;
use crate::ports::PeerTransport;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ExecuteResponse, PeerId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// A message as received by a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    pub from: PeerId,
    pub protocol: String,
    pub message: ExecuteResponse,
}

/// Registry of peer inboxes shared by all transports in a process.
#[derive(Default)]
pub struct InMemoryNetwork {
    inboxes: RwLock<HashMap<PeerId, mpsc::UnboundedSender<DeliveredMessage>>>,
}

impl InMemoryNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `peer` and return its inbox. Re-registering replaces the
    /// previous inbox.
    pub fn register(&self, peer: PeerId) -> mpsc::UnboundedReceiver<DeliveredMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inboxes.write().insert(peer, tx);
        rx
    }

    pub fn unregister(&self, peer: &PeerId) {
        self.inboxes.write().remove(peer);
    }

    pub fn is_registered(&self, peer: &PeerId) -> bool {
        self.inboxes.read().contains_key(peer)
    }

    /// Transport that sends as `local`.
    pub fn transport(self: &Arc<Self>, local: PeerId) -> InMemoryTransport {
        InMemoryTransport {
            local,
            network: Arc::clone(self),
        }
    }

    fn deliver(&self, target: &PeerId, message: DeliveredMessage) -> Result<(), TransportError> {
        let sender = self
            .inboxes
            .read()
            .get(target)
            .cloned()
            .ok_or_else(|| TransportError::Unreachable(target.clone()))?;

        sender.send(message).map_err(|_| TransportError::Closed)
    }
}

/// Sending half bound to one local peer.
pub struct InMemoryTransport {
    local: PeerId,
    network: Arc<InMemoryNetwork>,
}

impl InMemoryTransport {
    pub fn local_peer(&self) -> &PeerId {
        &self.local
    }
}

#[async_trait]
impl PeerTransport for InMemoryTransport {
    async fn send(
        &self,
        target: &PeerId,
        message: &ExecuteResponse,
        protocol: &str,
    ) -> Result<(), TransportError> {
        self.network.deliver(
            target,
            DeliveredMessage {
                from: self.local.clone(),
                protocol: protocol.to_string(),
                message: message.clone(),
            },
        )?;

        debug!(from = %self.local, to = %target, protocol, "Message delivered");
        Ok(())
    }
}
