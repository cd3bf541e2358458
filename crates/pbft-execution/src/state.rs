use crate::adapters::LivenessTimer;
use crate::domain::{
    CommitGate, CommitOutcome, ExecutionCache, GateDecision, PendingSet, ReplicaError,
    ReplicaResult, Request, RequestJournal, ViewChangeSignal,
};
use shared_types::Digest;

/// Mutable state of one replica.
///
/// Owned by `ReplicaService` behind a single mutex. Every method here is
/// short and non-blocking.
pub struct ReplicaState {
    pub journal: RequestJournal,
    pub pending: PendingSet,
    pub cache: ExecutionCache,
    pub gate: CommitGate,
    pub current_view: u64,
    pub timer: LivenessTimer,
}

/// Result of journaling a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intake {
    pub newly_journaled: bool,
    /// Pending went from empty to non-empty.
    pub arm_timer: bool,
}

/// Result of trying to claim a digest for execution.
#[derive(Debug)]
pub enum Claim {
    /// Removed from pending; the caller must execute it.
    Ready(Request),
    /// Not executed, for the reason given.
    Declined(CommitOutcome),
}

impl ReplicaState {
    pub fn new(timer: LivenessTimer) -> Self {
        Self {
            journal: RequestJournal::new(),
            pending: PendingSet::new(),
            cache: ExecutionCache::new(),
            gate: CommitGate::new(),
            current_view: 0,
            timer,
        }
    }

    /// Journal `request` and mark it pending if its digest is new.
    pub fn journal_request(&mut self, digest: Digest, request: Request) -> Intake {
        if !self.journal.insert(digest, request) {
            return Intake {
                newly_journaled: false,
                arm_timer: false,
            };
        }

        let was_empty = self.pending.is_empty();
        self.pending.insert(digest);

        Intake {
            newly_journaled: true,
            arm_timer: was_empty,
        }
    }

    /// Validate a commit and, if it may run now, claim the digest.
    ///
    /// Checks run in order: known digest, still pending, next in sequence.
    /// Only a `Ready` claim mutates state.
    pub fn claim(&mut self, sequence: u64, digest: &Digest) -> ReplicaResult<Claim> {
        let request = self
            .journal
            .get(digest)
            .cloned()
            .ok_or(ReplicaError::UnknownRequest(*digest))?;

        if !self.pending.contains(digest) {
            return Ok(Claim::Declined(CommitOutcome::AlreadyExecuted));
        }

        match self.gate.check(sequence) {
            GateDecision::Ready => {}
            GateDecision::Gap { expected, received } => {
                return Ok(Claim::Declined(CommitOutcome::SequenceGap {
                    expected,
                    received,
                }));
            }
            GateDecision::Behind {
                last_executed,
                received,
            } => {
                return Ok(Claim::Declined(CommitOutcome::OutOfOrder {
                    last_executed,
                    received,
                }));
            }
        }

        self.pending.claim(digest);
        Ok(Claim::Ready(request))
    }

    /// Expiry payload for the liveness timer, or `None` if nothing is pending.
    pub fn view_change_signal(&self) -> Option<ViewChangeSignal> {
        if self.pending.is_empty() {
            return None;
        }
        Some(ViewChangeSignal::new(
            self.current_view,
            self.pending.iter().copied().collect(),
        ))
    }
}
