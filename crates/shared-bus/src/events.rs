//! # Bus Events
//!
//! Every message carried on the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{FlowId, Hash, Party, ProgressStep};

/// Events published on the shared bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusEvent {
    /// A flow run reached a new step.
    FlowProgress {
        /// Flow run this step belongs to.
        flow_id: FlowId,
        /// The step reached.
        step: ProgressStep,
    },

    /// A flow run aborted at `step`.
    FlowFailed {
        /// Flow run that failed.
        flow_id: FlowId,
        /// Last step reached before failing.
        step: ProgressStep,
        /// Rendered error.
        reason: String,
    },

    /// A membership was activated and committed.
    MembershipActivated {
        /// Member whose record changed.
        party: Party,
        /// Committed transaction id.
        transaction_id: Hash,
    },

    /// A membership was suspended and committed.
    MembershipSuspended {
        /// Member whose record changed.
        party: Party,
        /// Committed transaction id.
        transaction_id: Hash,
    },
}

impl BusEvent {
    /// Topic of this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::FlowProgress { .. } | Self::FlowFailed { .. } => EventTopic::Progress,
            Self::MembershipActivated { .. } | Self::MembershipSuspended { .. } => {
                EventTopic::Membership
            }
        }
    }

    /// Flow run id, for progress events.
    #[must_use]
    pub fn flow_id(&self) -> Option<FlowId> {
        match self {
            Self::FlowProgress { flow_id, .. } | Self::FlowFailed { flow_id, .. } => {
                Some(*flow_id)
            }
            _ => None,
        }
    }
}

/// Event topics for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Flow progress and failures.
    Progress,
    /// Committed membership changes.
    Membership,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Restrict progress events to one flow run.
    pub flow_id: Option<FlowId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            flow_id: None,
        }
    }

    /// Create a filter for the progress of one flow run.
    #[must_use]
    pub fn flow(flow_id: FlowId) -> Self {
        Self {
            topics: vec![EventTopic::Progress],
            flow_id: Some(flow_id),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &BusEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let flow_match = match (self.flow_id, event.flow_id()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            (Some(_), None) => false,
            (None, _) => true,
        };

        topic_match && flow_match
    }
}
