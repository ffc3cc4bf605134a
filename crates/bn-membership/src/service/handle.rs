//! Handles to spawned flow runs

use crate::error::ActivationError;
use crate::ports::inbound::CommittedRecord;
use shared_types::FlowId;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Why a spawned flow produced no record.
#[derive(Debug, Error)]
pub enum FlowJoinError {
    /// The flow ran and failed.
    #[error("Flow failed: {0}")]
    Failed(#[from] ActivationError),

    /// The flow was aborted before completing.
    #[error("Flow cancelled")]
    Cancelled,

    /// The flow task panicked.
    #[error("Flow panicked: {0}")]
    Panicked(String),
}

/// A flow running on the tokio runtime.
#[derive(Debug)]
pub struct FlowHandle {
    flow_id: FlowId,
    join: JoinHandle<Result<CommittedRecord, ActivationError>>,
}

impl FlowHandle {
    pub(crate) fn new(
        flow_id: FlowId,
        join: JoinHandle<Result<CommittedRecord, ActivationError>>,
    ) -> Self {
        Self { flow_id, join }
    }

    pub fn flow_id(&self) -> FlowId {
        self.flow_id
    }

    /// Cancel the flow at its next suspension point.
    pub fn abort(&self) {
        self.join.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the flow to finish.
    pub async fn join(self) -> Result<CommittedRecord, FlowJoinError> {
        match self.join.await {
            Ok(result) => result.map_err(FlowJoinError::Failed),
            Err(err) if err.is_cancelled() => Err(FlowJoinError::Cancelled),
            Err(err) => Err(FlowJoinError::Panicked(err.to_string())),
        }
    }
}
