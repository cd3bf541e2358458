//! Results of intake and commit calls, and the per-commit execution context.

use shared_types::{Digest, ResultCode};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Acknowledgement of a submitted request.
///
/// The execution result is delivered later, through dissemination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAck {
    /// Always [`ResultCode::NoContent`].
    pub code: ResultCode,
    /// The request id, as supplied or as assigned.
    pub request_id: String,
    pub digest: Digest,
    /// `false` when the digest had already been journaled.
    pub newly_journaled: bool,
}

/// What a commit call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The request ran and the sequence advanced.
    Executed {
        sequence: u64,
        request_id: String,
        code: ResultCode,
    },
    /// The digest is no longer pending.
    AlreadyExecuted,
    /// Earlier sequence numbers have not executed. Nothing is buffered.
    SequenceGap { expected: u64, received: u64 },
    /// The sequence is at or below the last executed one.
    OutOfOrder { last_executed: u64, received: u64 },
}

impl CommitOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Executed { .. } => "executed",
            Self::AlreadyExecuted => "already_executed",
            Self::SequenceGap { .. } => "sequence_gap",
            Self::OutOfOrder { .. } => "out_of_order",
        }
    }
}

/// Limits applied to one executor invocation.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub deadline: Option<Instant>,
    pub cancel: CancellationToken,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: std::time::Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
