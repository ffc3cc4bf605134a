//! Progress reporting adapters
//!
//! `EventBusProgressSink` publishes flow progress and committed changes on
//! the shared bus. `RecordingProgressSink` keeps them in memory.

use crate::domain::Command;
use crate::error::ActivationError;
use crate::ports::outbound::ProgressSink;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{BusEvent, EventPublisher, InMemoryEventBus};
use shared_types::{FlowId, Hash, Party, ProgressStep};
use std::sync::Arc;
use tracing::debug;

/// Event bus adapter for flow progress.
pub struct EventBusProgressSink {
    event_bus: Arc<InMemoryEventBus>,
}

impl EventBusProgressSink {
    pub fn new(event_bus: Arc<InMemoryEventBus>) -> Self {
        Self { event_bus }
    }
}

#[async_trait]
impl ProgressSink for EventBusProgressSink {
    async fn step(&self, flow_id: FlowId, step: ProgressStep) {
        self.event_bus
            .publish(BusEvent::FlowProgress { flow_id, step })
            .await;
    }

    async fn failed(&self, flow_id: FlowId, error: &ActivationError) {
        self.event_bus
            .publish(BusEvent::FlowFailed {
                flow_id,
                step: error.step(),
                reason: error.kind().to_string(),
            })
            .await;
    }

    async fn committed(&self, party: &Party, command: Command, tx_id: Hash) {
        let event = match command {
            Command::Activate => BusEvent::MembershipActivated {
                party: party.clone(),
                transaction_id: tx_id,
            },
            Command::Suspend => BusEvent::MembershipSuspended {
                party: party.clone(),
                transaction_id: tx_id,
            },
        };

        let receivers = self.event_bus.publish(event).await;
        if receivers == 0 {
            debug!("[bn-membership] No subscribers for membership change of {}", party);
        }
    }
}

/// A committed change as seen by [`RecordingProgressSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCommit {
    pub party: Party,
    pub command: Command,
    pub tx_id: Hash,
}

/// In-memory sink for tests and inspection.
#[derive(Default)]
pub struct RecordingProgressSink {
    steps: RwLock<Vec<(FlowId, ProgressStep)>>,
    failures: RwLock<Vec<(FlowId, ActivationError)>>,
    commits: RwLock<Vec<RecordedCommit>>,
}

impl RecordingProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps reported for one flow run, in order.
    pub fn steps_for(&self, flow_id: FlowId) -> Vec<ProgressStep> {
        self.steps
            .read()
            .iter()
            .filter(|(id, _)| *id == flow_id)
            .map(|(_, step)| *step)
            .collect()
    }

    /// Distinct flow ids in order of first report.
    pub fn flow_ids(&self) -> Vec<FlowId> {
        let mut ids: Vec<FlowId> = Vec::new();
        for (id, _) in self.steps.read().iter() {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    pub fn failures(&self) -> Vec<(FlowId, ActivationError)> {
        self.failures.read().clone()
    }

    pub fn commits(&self) -> Vec<RecordedCommit> {
        self.commits.read().clone()
    }
}

#[async_trait]
impl ProgressSink for RecordingProgressSink {
    async fn step(&self, flow_id: FlowId, step: ProgressStep) {
        self.steps.write().push((flow_id, step));
    }

    async fn failed(&self, flow_id: FlowId, error: &ActivationError) {
        self.failures.write().push((flow_id, error.clone()));
    }

    async fn committed(&self, party: &Party, command: Command, tx_id: Hash) {
        self.commits.write().push(RecordedCommit {
            party: party.clone(),
            command,
            tx_id,
        });
    }
}
