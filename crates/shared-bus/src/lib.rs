//! # Shared Bus - Event Bus for Flow Observability
//!
//! Carries two kinds of traffic:
//!
//! - **Progress**: ordered `ProgressStep`s of individual flow runs, keyed by
//!   flow id, plus a failure notice if a run aborts.
//! - **Membership**: notifications that a membership change was committed.
//!
//! ```text
//! ┌──────────────────┐                    ┌──────────────────┐
//! │ MembershipService│    publish()       │  Operator CLI /  │
//! │                  │ ──────┐            │  audit consumer  │
//! └──────────────────┘       │            └──────────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐           │
//!                      │  Event Bus   │ ──────────┘
//!                      └──────────────┘  subscribe()
//! ```
//!
//! Consumers observe; they never influence flow outcomes. A slow subscriber
//! lags and loses events rather than blocking publishers.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{BusEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, FlowTrace, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

