//! Commit gate.
//!
//! Requests execute in strictly increasing, gap-free sequence order. The
//! gate only answers whether a sequence number may execute now; it never
//! buffers commits that arrive early.

use serde::{Deserialize, Serialize};

/// Verdict for a proposed sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// `sequence == last_executed + 1`.
    Ready,
    /// Earlier sequence numbers have not executed yet.
    Gap { expected: u64, received: u64 },
    /// At or below the last executed sequence.
    Behind { last_executed: u64, received: u64 },
}

/// Tracks the last executed sequence number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitGate {
    last_executed: u64,
}

impl CommitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a known position.
    pub fn starting_at(last_executed: u64) -> Self {
        Self { last_executed }
    }

    pub fn last_executed(&self) -> u64 {
        self.last_executed
    }

    pub fn next_expected(&self) -> u64 {
        self.last_executed.saturating_add(1)
    }

    pub fn check(&self, sequence: u64) -> GateDecision {
        let expected = self.next_expected();
        if sequence == expected {
            GateDecision::Ready
        } else if sequence > expected {
            GateDecision::Gap {
                expected,
                received: sequence,
            }
        } else {
            GateDecision::Behind {
                last_executed: self.last_executed,
                received: sequence,
            }
        }
    }

    /// Record `sequence` as executed. Only moves forward.
    pub fn advance(&mut self, sequence: u64) {
        self.last_executed = self.last_executed.max(sequence);
    }
}
