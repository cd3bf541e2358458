//! # Shared Crypto
//!
//! Cryptographic primitives used by replicas.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Request content digests |
//! | `signatures` | Ed25519 | Replica identity, signed result messages |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **Secret keys** are zeroized when a keypair is dropped

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{content_digest, Sha256Hasher};
pub use signatures::{ReplicaKeyPair, ReplicaPublicKey, ReplicaSignature};
