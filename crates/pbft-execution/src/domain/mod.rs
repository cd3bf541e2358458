//! Domain layer: requests, journal, pending set, cache and commit gate.
//!
//! Everything here is synchronous and free of I/O. The service owns these
//! structures behind its state lock.

pub mod cache;
pub mod errors;
pub mod invariants;
pub mod journal;
pub mod outcome;
pub mod request;
pub mod sequencer;
pub mod view;

pub use cache::ExecutionCache;
pub use errors::{
    ExecutorError, PublishError, ReplicaError, ReplicaResult, SigningError, TransportError,
};
pub use journal::{PendingSet, RequestJournal};
pub use outcome::{CommitOutcome, ExecutionContext, SubmitAck};
pub use request::Request;
pub use sequencer::{CommitGate, GateDecision};
pub use view::{primary_for_view, ResultSink, ViewChangeSignal};
