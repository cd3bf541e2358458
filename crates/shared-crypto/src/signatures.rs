//! # Replica Identity Signatures
//!
//! Every replica holds one Ed25519 keypair. It signs the result messages it
//! emits; peers and the primary verify them against the replica's public key.

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use std::fmt;
use zeroize::Zeroize;

/// Ed25519 public key (32 bytes) of a replica.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplicaPublicKey([u8; 32]);

impl ReplicaPublicKey {
    /// Create from bytes, rejecting points that are not on the curve.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Parse from lowercase or uppercase hex.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidPublicKey)?;
        let array: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Self::from_bytes(array)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex encoding, used as the replica's peer identity.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &ReplicaSignature) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;

        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

impl fmt::Debug for ReplicaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReplicaPublicKey({})", hex::encode(&self.0[..4]))
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ReplicaSignature([u8; 64]);

impl ReplicaSignature {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Parse the hex form carried in result messages.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes =
            hex::decode(s).map_err(|e| CryptoError::InvalidSignatureFormat(e.to_string()))?;
        let array: [u8; 64] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidSignatureFormat(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(array))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ReplicaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReplicaSignature({}..)", hex::encode(&self.0[..4]))
    }
}

/// A replica's Ed25519 keypair.
pub struct ReplicaKeyPair {
    signing_key: SigningKey,
}

impl ReplicaKeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    /// Get public key.
    pub fn public_key(&self) -> ReplicaPublicKey {
        ReplicaPublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message (deterministic - no RNG needed).
    pub fn sign(&self, message: &[u8]) -> ReplicaSignature {
        ReplicaSignature(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for ReplicaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicaKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl Drop for ReplicaKeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}
