//! Ports layer - hexagonal architecture interfaces

pub mod inbound;
pub mod outbound;

pub use inbound::ReplicaApi;
pub use outbound::{
    ClusterPublisher, PeerTransport, PostProcessor, ResultSigner, ViewChangeTrigger,
    WorkloadExecutor,
};
