//! # SHA-256 Content Digests
//!
//! Requests are identified by the SHA-256 of their canonical encoding. The
//! caller chooses the encoding; this module only hashes bytes.

use sha2::{Digest as _, Sha256};
use shared_types::Digest;

/// Stateful SHA-256 hasher producing a [`Digest`].
#[derive(Clone, Default)]
pub struct Sha256Hasher {
    inner: Sha256,
}

impl Sha256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> Digest {
        Digest::from_bytes(self.inner.finalize().into())
    }
}

/// Digest of a single byte string (one-shot).
pub fn content_digest(data: &[u8]) -> Digest {
    let mut hasher = Sha256Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        // SHA-256("abc")
        let digest = content_digest(b"abc");
        assert_eq!(
            digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_different_inputs() {
        assert_ne!(content_digest(b"input1"), content_digest(b"input2"));
    }

    #[test]
    fn test_streaming_matches_oneshot() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ").update(b"world");
        assert_eq!(hasher.finalize(), content_digest(b"hello world"));
    }
}
