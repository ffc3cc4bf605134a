//! Crypto error types.

use thiserror::Error;

/// Key and signature failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The signature does not verify for this key and message.
    #[error("Ed25519 signature does not verify")]
    SignatureVerificationFailed,

    /// The bytes are not a valid Ed25519 point.
    #[error("Not a valid Ed25519 public key")]
    InvalidPublicKey,

    /// Seed text is not valid hex.
    #[error("Seed is not valid hex: {0}")]
    InvalidSeedEncoding(String),

    /// Seed material of the wrong size.
    #[error("Seed must be {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required seed length in bytes.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
}
