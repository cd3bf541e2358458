//! Domain invariants for the execution pipeline.
//!
//! Pure predicates over replica state, checked in tests and in debug
//! assertions.

use super::journal::{PendingSet, RequestJournal};
use shared_types::Digest;
use std::collections::HashMap;

/// INVARIANT-1: Pending ⊆ Journal
/// Every pending digest has a journaled request.
pub fn invariant_pending_subset_of_journal(pending: &PendingSet, journal: &RequestJournal) -> bool {
    pending.iter().all(|digest| journal.contains(digest))
}

/// INVARIANT-2: Exactly Once
/// No digest was handed to the executor more than once.
pub fn invariant_exactly_once(executions: &[Digest]) -> bool {
    let mut seen: HashMap<&Digest, usize> = HashMap::new();
    for digest in executions {
        let count = seen.entry(digest).or_insert(0);
        *count += 1;
        if *count > 1 {
            return false;
        }
    }
    true
}

/// INVARIANT-3: Strict Order
/// Executed sequence numbers are exactly 1, 2, 3, ... in order.
pub fn invariant_strict_order(executed_sequences: &[u64]) -> bool {
    executed_sequences
        .iter()
        .enumerate()
        .all(|(i, &sequence)| sequence == i as u64 + 1)
}

/// INVARIANT-4: Timer Correlation
/// The liveness timer runs if and only if requests are pending.
pub fn invariant_timer_correlation(pending_len: usize, timer_running: bool) -> bool {
    (pending_len > 0) == timer_running
}
