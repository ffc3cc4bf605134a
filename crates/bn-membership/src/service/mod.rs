//! Membership Service - flow orchestration
//!
//! ```text
//! activate_for(P) ─→ [guard] ─→ [lookup P] ─→ [decide] ─┬─ NoOp ──────────────→ AlreadyActive
//!                                                       └─ Transition ─→ [build, sign, commit] ─→ Activated
//! self_issue(v)   ─→ [guard] ─→ [v current?] ─→ [decide] ─── ...
//! suspend_for(P)  ─→ [guard] ─→ [lookup P] ─→ [decide] ─── ...
//! ```
//!
//! The service owns no records. Each run reports its steps to the
//! `ProgressSink` under its own flow id, and the only path that produces a
//! new current version is `FinalityGateway::finalize`.

mod handle;

pub use handle::{FlowHandle, FlowJoinError};

use crate::domain::{
    authorize_operator, decide, Decision, MembershipEvent, MembershipStatus, SignedTransaction,
    StateAndRef, TransactionBuilder,
};
use crate::error::{ActivationError, CommitError, MembershipError, MembershipResult};
use crate::metrics;
use crate::ports::inbound::{CommittedRecord, FlowRequest, MembershipApi};
use crate::ports::outbound::{
    Clock, FinalityGateway, IdentityProvider, MembershipRecordStore, NetworkConfigProvider,
    ProgressSink, SystemClock, TransactionSigner,
};
use async_trait::async_trait;
use shared_types::{FlowId, Party, ProgressStep};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// Membership service configuration
#[derive(Clone, Debug)]
pub struct MembershipConfig {
    /// Upper bound on waiting for a finality acknowledgement. A commit that
    /// takes longer is reported as unresolved.
    pub commit_timeout: Duration,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            commit_timeout: Duration::from_secs(30),
        }
    }
}

/// Dependencies for MembershipService
pub struct MembershipDependencies {
    pub store: Arc<dyn MembershipRecordStore>,
    pub finality: Arc<dyn FinalityGateway>,
    pub signer: Arc<dyn TransactionSigner>,
    pub identity: Arc<dyn IdentityProvider>,
    pub network: Arc<dyn NetworkConfigProvider>,
    pub progress: Arc<dyn ProgressSink>,
    pub config: MembershipConfig,
}

/// Step tracking for one flow run.
struct FlowRun {
    flow_id: FlowId,
    step: ProgressStep,
}

impl FlowRun {
    fn new(flow_id: FlowId) -> Self {
        Self {
            flow_id,
            step: ProgressStep::VerifyingOperator,
        }
    }

    async fn advance(&mut self, sink: &dyn ProgressSink, step: ProgressStep) {
        self.step = step;
        sink.step(self.flow_id, step).await;
    }

    fn fail(&self, kind: MembershipError) -> ActivationError {
        ActivationError::new(self.step, kind)
    }
}

/// Membership Service implementation
pub struct MembershipService {
    store: Arc<dyn MembershipRecordStore>,
    finality: Arc<dyn FinalityGateway>,
    signer: Arc<dyn TransactionSigner>,
    identity: Arc<dyn IdentityProvider>,
    network: Arc<dyn NetworkConfigProvider>,
    progress: Arc<dyn ProgressSink>,
    config: MembershipConfig,
    clock: Box<dyn Clock>,
}

impl MembershipService {
    /// Create a new MembershipService
    pub fn new(deps: MembershipDependencies) -> Self {
        Self {
            store: deps.store,
            finality: deps.finality,
            signer: deps.signer,
            identity: deps.identity,
            network: deps.network,
            progress: deps.progress,
            config: deps.config,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the clock used to timestamp new versions.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &MembershipConfig {
        &self.config
    }

    /// Run `request` as a background task.
    ///
    /// The returned handle can be awaited or aborted. Aborting while the
    /// commit is in flight leaves the outcome to the finality gateway.
    pub fn spawn(self: &Arc<Self>, flow_id: FlowId, request: FlowRequest) -> FlowHandle {
        let service = Arc::clone(self);
        let join = tokio::spawn(async move { service.execute(flow_id, request).await });
        FlowHandle::new(flow_id, join)
    }

    /// Fail unless this node is the business network operator.
    async fn verify_operator(&self, run: &mut FlowRun) -> Result<(), ActivationError> {
        run.advance(self.progress.as_ref(), ProgressStep::VerifyingOperator).await;
        let operator = self.network.operator().map_err(|e| run.fail(e))?;
        authorize_operator(&self.identity.our_identity(), &operator).map_err(|e| run.fail(e))
    }

    async fn lookup(
        &self,
        run: &mut FlowRun,
        party: &Party,
    ) -> Result<StateAndRef, ActivationError> {
        run.advance(self.progress.as_ref(), ProgressStep::LookingForMembershipState).await;
        self.store
            .current_membership(party)
            .await
            .map_err(|e| run.fail(e))?
            .ok_or_else(|| {
                run.fail(MembershipError::NotFound {
                    party: party.to_string(),
                })
            })
    }

    /// Fail with `StaleVersion` unless `version` is still current.
    async fn confirm_current(
        &self,
        run: &mut FlowRun,
        version: &StateAndRef,
    ) -> Result<(), ActivationError> {
        let current = self.lookup(run, &version.state.party).await?;
        if current.reference != version.reference {
            return Err(run.fail(MembershipError::StaleVersion {
                given: version.reference,
                current: current.reference,
            }));
        }
        Ok(())
    }

    /// Apply `event` to `version`, committing a new version if required.
    async fn apply(
        &self,
        run: &mut FlowRun,
        version: StateAndRef,
        event: MembershipEvent,
    ) -> Result<CommittedRecord, ActivationError> {
        let status = match decide(&version.state, event).map_err(|e| run.fail(e))? {
            Decision::NoOp => {
                run.advance(self.progress.as_ref(), event.no_op_step()).await;
                metrics::record_noop(&event.to_string());
                info!(
                    party = %version.state.party,
                    status = %version.state.status,
                    "[bn-membership] Nothing to {}, membership unchanged",
                    event
                );
                return Ok(CommittedRecord {
                    record: version,
                    transaction: None,
                    flow_id: run.flow_id,
                });
            }
            Decision::Transition(status) => status,
        };

        run.advance(self.progress.as_ref(), event.in_progress_step()).await;
        let committed = self
            .commit(&version, status, event)
            .await
            .map_err(|e| run.fail(e.into()))?;
        let record = committed.out_ref(0).ok_or_else(|| {
            run.fail(MembershipError::Commit(CommitError::Rejected {
                reason: "committed transaction has no output".into(),
            }))
        })?;

        self.progress
            .committed(&record.state.party, committed.tx.command, committed.id())
            .await;
        run.advance(self.progress.as_ref(), event.done_step()).await;
        metrics::record_transition(&committed.tx.command.to_string());
        info!(
            party = %record.state.party,
            from = %version.state.status,
            to = %record.state.status,
            "[bn-membership] Membership committed as {}",
            record.reference
        );

        Ok(CommittedRecord {
            record,
            transaction: Some(committed),
            flow_id: run.flow_id,
        })
    }

    /// Build, sign and finalize the transaction superseding `version`.
    async fn commit(
        &self,
        version: &StateAndRef,
        status: MembershipStatus,
        event: MembershipEvent,
    ) -> Result<SignedTransaction, CommitError> {
        let result = self.try_commit(version, status, event).await;
        if let Err(err) = &result {
            metrics::record_commit_failure(err.reason_label());
            warn!(
                party = %version.state.party,
                input = %version.reference,
                "[bn-membership] Commit failed: {}",
                err
            );
        }
        result
    }

    async fn try_commit(
        &self,
        version: &StateAndRef,
        status: MembershipStatus,
        event: MembershipEvent,
    ) -> Result<SignedTransaction, CommitError> {
        let notary = self.network.notary().map_err(|e| CommitError::Rejected {
            reason: e.to_string(),
        })?;
        let signer = self.identity.our_identity().owning_key;
        let output = version
            .state
            .supersede(version.reference, status, self.clock.now());

        let mut builder = TransactionBuilder::new(notary);
        builder
            .add_input_state(version)
            .add_output_state(output)
            .add_command(event.command(), signer);
        let wire = builder.to_wire_transaction()?;
        let tx_id = wire.id();

        let signature = self.signer.sign(&wire).await?;
        let signed = SignedTransaction::new(wire, signature);

        let started = Instant::now();
        let outcome =
            tokio::time::timeout(self.config.commit_timeout, self.finality.finalize(signed)).await;
        metrics::observe_commit_duration(started.elapsed().as_secs_f64());

        outcome.unwrap_or(Err(CommitError::Unresolved { tx_id }))
    }

    async fn run(
        &self,
        run: &mut FlowRun,
        request: FlowRequest,
    ) -> Result<CommittedRecord, ActivationError> {
        self.verify_operator(run).await?;
        match request {
            FlowRequest::ActivateFor(party) => {
                let version = self.lookup(run, &party).await?;
                run.advance(
                    self.progress.as_ref(),
                    ProgressStep::ActivatingTheMembershipState,
                )
                .await;
                self.apply(run, version, MembershipEvent::Activate).await
            }
            FlowRequest::SelfIssue(version) => {
                self.confirm_current(run, &version).await?;
                self.apply(run, version, MembershipEvent::Activate).await
            }
            FlowRequest::SuspendFor(party) => {
                let version = self.lookup(run, &party).await?;
                self.apply(run, version, MembershipEvent::Suspend).await
            }
        }
    }
}

#[async_trait]
impl MembershipApi for MembershipService {
    async fn execute(
        &self,
        flow_id: FlowId,
        request: FlowRequest,
    ) -> Result<CommittedRecord, ActivationError> {
        let mut run = FlowRun::new(flow_id);
        let result = self.run(&mut run, request).await;

        if let Err(err) = &result {
            metrics::record_flow_failure(err.kind().kind_label());
            warn!(%flow_id, "[bn-membership] Flow failed at '{}': {}", err.step(), err.kind());
            self.progress.failed(flow_id, err).await;
        }
        result
    }

    async fn activate_for(&self, party: &Party) -> Result<CommittedRecord, ActivationError> {
        self.execute(Uuid::new_v4(), FlowRequest::ActivateFor(party.clone())).await
    }

    async fn self_issue(&self, version: StateAndRef) -> Result<CommittedRecord, ActivationError> {
        self.execute(Uuid::new_v4(), FlowRequest::SelfIssue(version)).await
    }

    async fn suspend_for(&self, party: &Party) -> Result<CommittedRecord, ActivationError> {
        self.execute(Uuid::new_v4(), FlowRequest::SuspendFor(party.clone())).await
    }

    async fn current_membership(&self, party: &Party) -> MembershipResult<Option<StateAndRef>> {
        self.store.current_membership(party).await
    }
}
