//! JSON-friendly summaries of flow runs.

use bn_membership::{
    CommittedRecord, FlowJoinError, MembershipRecord, MembershipResult, StateAndRef,
};
use serde::Serialize;
use shared_bus::FlowTrace;
use shared_types::{FlowId, Party};

/// How a flow run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Committed,
    Unchanged,
    Failed,
    /// Status lookup only.
    Current,
    Missing,
}

/// One line of `bn-node` output.
#[derive(Clone, Debug, Serialize)]
pub struct FlowReport {
    pub party: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<FlowId>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<MembershipRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
}

impl FlowReport {
    fn empty(party: &Party, outcome: Outcome) -> Self {
        Self {
            party: party.to_string(),
            flow_id: None,
            outcome,
            status: None,
            transaction_id: None,
            reference: None,
            record: None,
            error: None,
            steps: Vec::new(),
        }
    }

    fn with_version(mut self, version: &StateAndRef) -> Self {
        self.status = Some(version.state.status.to_string());
        self.reference = Some(version.reference.to_string());
        self.record = Some(version.state.clone());
        self
    }

    /// Report a joined flow run together with the steps it published.
    pub fn flow(
        party: &Party,
        flow_id: FlowId,
        outcome: Result<CommittedRecord, FlowJoinError>,
        trace: FlowTrace,
    ) -> Self {
        let steps = trace
            .steps
            .iter()
            .map(|step| step.label().to_string())
            .collect();

        let mut report = match outcome {
            Ok(committed) => {
                let kind = if committed.is_unchanged() {
                    Outcome::Unchanged
                } else {
                    Outcome::Committed
                };
                let mut report = Self::empty(party, kind).with_version(&committed.record);
                report.transaction_id = committed.transaction_id().map(hex::encode);
                report
            }
            Err(err) => {
                let mut report = Self::empty(party, Outcome::Failed);
                report.error = Some(err.to_string());
                report
            }
        };
        report.flow_id = Some(flow_id);
        report.steps = steps;
        report
    }

    /// Report a read-only status lookup.
    pub fn status(party: &Party, current: MembershipResult<Option<StateAndRef>>) -> Self {
        match current {
            Ok(Some(version)) => Self::empty(party, Outcome::Current).with_version(&version),
            Ok(None) => Self::empty(party, Outcome::Missing),
            Err(err) => {
                let mut report = Self::empty(party, Outcome::Failed);
                report.error = Some(err.to_string());
                report
            }
        }
    }
}
