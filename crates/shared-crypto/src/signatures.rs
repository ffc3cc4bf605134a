//! # Ed25519 Signatures
//!
//! Twisted Edwards curve signatures with deterministic nonces.
//!
//! ## Security Properties
//!
//! - No RNG dependency (deterministic nonce from message)
//! - Strict verification (rejects malleable and small-order encodings)

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use shared_types::{PublicKey, Signature};
use zeroize::{Zeroize, Zeroizing};

/// Verify `signature` over `message` against a raw public key.
pub fn verify_signature(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
) -> Result<(), CryptoError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;

    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

    verifying_key
        .verify_strict(message, &sig)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

/// Ed25519 keypair.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret seed (32 bytes). The passed copy is wiped.
    pub fn from_seed(mut seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Self { signing_key }
    }

    /// Create from a seed slice, checking its length.
    pub fn from_seed_slice(seed: &[u8]) -> Result<Self, CryptoError> {
        let seed: [u8; 32] = seed.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: seed.len(),
        })?;
        Ok(Self::from_seed(seed))
    }

    /// Create from a hex-encoded seed, as found in config files.
    pub fn from_seed_hex(seed_hex: &str) -> Result<Self, CryptoError> {
        let decoded = hex::decode(seed_hex.trim())
            .map_err(|e| CryptoError::InvalidSeedEncoding(e.to_string()))?;
        let seed = Zeroizing::new(decoded);
        Self::from_seed_slice(&seed)
    }

    /// Get public key.
    pub fn public_key(&self) -> PublicKey {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message (deterministic - no RNG needed).
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("public_key", &hex_prefix(&self.public_key()))
            .finish_non_exhaustive()
    }
}

fn hex_prefix(key: &PublicKey) -> String {
    key[..6].iter().map(|b| format!("{b:02x}")).collect()
}
