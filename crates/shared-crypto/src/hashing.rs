//! # SHA3-256 Hashing
//!
//! Transaction ids are SHA3-256 digests over a domain tag followed by the
//! canonical encoding of the change-set.

use sha3::{Digest, Sha3_256};
use shared_types::Hash;

/// Stateful SHA3-256 hasher.
pub struct Sha3Hasher {
    inner: Sha3_256,
}

impl Sha3Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Sha3_256::new(),
        }
    }

    /// Create a hasher pre-seeded with a domain separation tag.
    pub fn with_domain(tag: &[u8]) -> Self {
        let mut hasher = Self::new();
        hasher.update(tag);
        hasher
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

impl Default for Sha3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with SHA3-256 (one-shot).
pub fn sha3_256(data: &[u8]) -> Hash {
    Sha3_256::digest(data).into()
}
