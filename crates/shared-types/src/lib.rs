//! # Shared Types Crate
//!
//! Identity and progress types used across the membership workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Types that cross crate boundaries (parties,
//!   hashes, progress steps) are defined here and nowhere else.
//! - **Identity is key-bound**: a [`Party`] is a well-known name plus the public
//!   key that signs on its behalf. Two parties are equal only if both match.

pub mod entities;
pub mod progress;

pub use entities::*;
pub use progress::{FlowId, ProgressStep};
