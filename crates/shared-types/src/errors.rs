//! # Error Types
//!
//! Errors produced while decoding shared types.

use thiserror::Error;

/// Errors produced when parsing a hex-encoded digest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestParseError {
    /// The input was not valid hex.
    #[error("Invalid hex digest: {0}")]
    InvalidHex(String),

    /// The decoded digest had the wrong length.
    #[error("Invalid digest length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}
