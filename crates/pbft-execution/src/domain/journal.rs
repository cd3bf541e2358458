//! Request journal and pending set.
//!
//! The journal remembers every request ever seen, by digest. The pending set
//! marks the subset not yet executed; removing a digest from it is the single
//! point at which a request is claimed for execution.

use super::request::Request;
use shared_types::Digest;
use std::collections::{HashMap, HashSet};

/// Digest → request, insert-once.
#[derive(Debug, Default)]
pub struct RequestJournal {
    entries: HashMap<Digest, Request>,
}

impl RequestJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `request` under `digest`. Returns `false` and leaves the
    /// existing entry untouched when the digest is already present.
    pub fn insert(&mut self, digest: Digest, request: Request) -> bool {
        if self.entries.contains_key(&digest) {
            return false;
        }
        self.entries.insert(digest, request);
        true
    }

    pub fn get(&self, digest: &Digest) -> Option<&Request> {
        self.entries.get(digest)
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.entries.contains_key(digest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn digests(&self) -> impl Iterator<Item = &Digest> {
        self.entries.keys()
    }
}

/// Digests journaled but not yet claimed for execution.
#[derive(Debug, Default)]
pub struct PendingSet {
    digests: HashSet<Digest>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `digest` pending. Returns `true` if it was not already.
    pub fn insert(&mut self, digest: Digest) -> bool {
        self.digests.insert(digest)
    }

    /// Claim `digest` for execution. Returns `true` exactly once per digest.
    pub fn claim(&mut self, digest: &Digest) -> bool {
        self.digests.remove(digest)
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.digests.contains(digest)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Digest> {
        self.digests.iter()
    }
}
