//! # Core Identity Entities
//!
//! ## Clusters
//!
//! - **Primitives**: `Hash`, `PublicKey`, `Signature`
//! - **Identity**: `Party`, `LinearId`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A 32-byte hash (SHA3-256).
pub type Hash = [u8; 32];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// A 64-byte Ed25519 signature.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde_as(as = "Bytes")] pub [u8; 64]);

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..8]))
    }
}

/// Errors raised while parsing identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Party name is empty or whitespace.
    #[error("Party name must not be empty")]
    EmptyName,

    /// Public key is not 32 bytes of hex.
    #[error("Invalid public key hex: {0}")]
    InvalidKey(String),
}

/// A well-known network participant.
///
/// The owning key is the key that must sign any command the party is
/// required to sign.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    /// X.500-style well-known name, e.g. `O=BNO,L=London,C=GB`.
    pub name: String,
    /// Ed25519 key that signs on behalf of this party.
    pub owning_key: PublicKey,
}

impl Party {
    /// Create a party, rejecting empty names.
    pub fn new(name: impl Into<String>, owning_key: PublicKey) -> Result<Self, IdentityError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdentityError::EmptyName);
        }
        Ok(Self { name, owning_key })
    }

    /// Create a party from a hex-encoded owning key.
    pub fn from_hex_key(name: impl Into<String>, key_hex: &str) -> Result<Self, IdentityError> {
        let bytes = hex::decode(key_hex).map_err(|e| IdentityError::InvalidKey(e.to_string()))?;
        let owning_key: PublicKey = bytes
            .try_into()
            .map_err(|_| IdentityError::InvalidKey(format!("expected 32 bytes: {key_hex}")))?;
        Self::new(name, owning_key)
    }

    /// Short hex fingerprint of the owning key, for logs.
    pub fn key_fingerprint(&self) -> String {
        hex::encode(&self.owning_key[..6])
    }
}

impl fmt::Debug for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Party({} #{})", self.name, self.key_fingerprint())
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Stable identifier shared by every version of one record lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinearId(pub Uuid);

impl LinearId {
    /// Fresh random lineage id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LinearId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LinearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
