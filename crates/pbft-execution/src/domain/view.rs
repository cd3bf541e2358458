//! View-related values: primary selection, result routing and the signal
//! the liveness timer emits.

use shared_types::{Digest, PeerId};

/// Primary of `view` in a fixed, ordered replica set.
///
/// Returns `None` only for an empty replica set.
pub fn primary_for_view(view: u64, replicas: &[PeerId]) -> Option<&PeerId> {
    if replicas.is_empty() {
        return None;
    }
    let index = (view % replicas.len() as u64) as usize;
    replicas.get(index)
}

/// Where a signed result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSink {
    /// This replica is primary: publish on the cluster channel.
    ClusterBroadcast { channel: String },
    /// Send to the primary over the peer transport.
    PointToPoint { primary: PeerId, protocol: String },
}

impl ResultSink {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ClusterBroadcast { .. } => "cluster_broadcast",
            Self::PointToPoint { .. } => "point_to_point",
        }
    }
}

/// Emitted when pending requests made no progress within the request timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewChangeSignal {
    pub current_view: u64,
    pub proposed_view: u64,
    /// Digests still pending at expiry.
    pub pending: Vec<Digest>,
}

impl ViewChangeSignal {
    pub fn new(current_view: u64, mut pending: Vec<Digest>) -> Self {
        pending.sort();
        Self {
            current_view,
            proposed_view: current_view.saturating_add(1),
            pending,
        }
    }
}
