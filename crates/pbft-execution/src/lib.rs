//! # pbft-execution
//!
//! Request-ordering and execution-commit pipeline for a PBFT replica.
//!
//! ## Architecture
//!
//! Client requests are journaled on arrival and executed only after the
//! agreement layer has assigned them a sequence number. Each request runs
//! exactly once, in sequence order; the signed result is routed back
//! through the primary of the current view.
//!
//! ```text
//! submit ──→ [Journal + Pending] ──(agreement)──→ commit
//!                                                   │
//!                    ┌──────────────────────────────┘
//!                    ↓
//!            [Commit Gate] ──→ [Executor] ──→ advance sequence, reset timer
//!                                                   │
//!                    ┌──────────────────────────────┘
//!                    ↓
//!            hooks ──→ sign ──→ cache ──→ disseminate
//!                                          ├─ primary: cluster channel
//!                                          └─ others:  send to primary
//! ```
//!
//! The agreement exchange itself, peer discovery, the executor runtime and
//! the view-change election live outside this crate and are reached
//! through the traits in [`ports`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pbft_execution::{ReplicaApi, ReplicaConfig, ReplicaDependencies, ReplicaService};
//!
//! let service = ReplicaService::new(ReplicaDependencies {
//!     executor,
//!     transport,
//!     publisher,
//!     signer,
//!     view_change,
//!     replicas,
//!     config: ReplicaConfig::from_env(),
//! });
//!
//! let ack = service.submit(client, request_id, timestamp, payload).await?;
//! // ... agreement layer orders the request ...
//! let outcome = service.commit(view, sequence, ack.digest).await?;
//! ```
//!
//! ## Guarantees
//!
//! - A digest leaves the pending set exactly once; only then does it run
//! - A request with sequence `s` runs only when `s == last_executed + 1`
//! - Early commits are declined, not buffered, and must be delivered again
//! - The liveness timer runs exactly while requests are pending

pub mod adapters;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod state;

// Re-export main types
pub use adapters::{
    verify_response, Ed25519ResultSigner, InMemoryNetwork, InMemoryTransport, LivenessTimer,
};
pub use config::ReplicaConfig;
pub use domain::{
    primary_for_view, CommitOutcome, ExecutionContext, ExecutorError, PublishError, ReplicaError,
    ReplicaResult, Request, ResultSink, SigningError, SubmitAck, TransportError,
    ViewChangeSignal,
};
pub use ports::{
    ClusterPublisher, PeerTransport, PostProcessor, ReplicaApi, ResultSigner, ViewChangeTrigger,
    WorkloadExecutor,
};
pub use service::{ReplicaDependencies, ReplicaService};
