//! # Shared Crypto - Signing and Hashing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA3-256 | Transaction ids |
//! | `signatures` | Ed25519 | Transaction signatures |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **Secret hygiene**: decoded seed buffers are zeroized; `SigningKey` wipes
//!   itself on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{sha3_256, Sha3Hasher};
pub use signatures::{verify_signature, Ed25519KeyPair};
