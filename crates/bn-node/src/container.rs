//! # Membership Node Container
//!
//! Holds the event bus, the in-memory ledger, this node's identity and the
//! membership service wired together, and runs operator flows for named
//! parties.

use crate::config::{ConfigError, NodeConfig};
use crate::report::FlowReport;
use bn_membership::adapters::{
    EventBusProgressSink, InMemoryLedger, LocalIdentity, StaticNetworkConfig,
};
use bn_membership::{
    FlowRequest, MembershipApi, MembershipConfig, MembershipDependencies, MembershipError,
    MembershipService, StateAndRef,
};
use bn_telemetry::{log_flow_event, log_membership_event};
use chrono::Utc;
use shared_bus::{EventFilter, EventSubscriber, InMemoryEventBus};
use shared_types::Party;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Node start-up and command errors.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to seed membership: {0}")]
    Seed(#[from] MembershipError),

    #[error("Unknown party {0}: not in the seeded memberships")]
    UnknownParty(String),
}

/// Operator actions the node can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeAction {
    Activate,
    Suspend,
    Status,
}

/// Fully wired membership node.
pub struct MembershipNode {
    bus: Arc<InMemoryEventBus>,
    ledger: Arc<InMemoryLedger>,
    identity: Arc<LocalIdentity>,
    service: Arc<MembershipService>,
    members: Vec<Party>,
}

impl MembershipNode {
    /// Build the node and seed every configured membership as PENDING.
    pub fn new(config: &NodeConfig) -> Result<Self, NodeError> {
        let identity = Arc::new(
            LocalIdentity::new(config.node.name.clone(), config.keypair()?).map_err(|source| {
                ConfigError::Identity {
                    name: config.node.name.clone(),
                    source,
                }
            })?,
        );
        let us = identity.party().clone();
        let operator = config.operator(&us)?;
        let notary = config.notary()?;

        let bus = Arc::new(InMemoryEventBus::new());
        let ledger = Arc::new(InMemoryLedger::new(notary.clone(), operator.clone()));

        let deps = MembershipDependencies {
            store: ledger.clone(),
            finality: ledger.clone(),
            signer: identity.clone(),
            identity: identity.clone(),
            network: Arc::new(StaticNetworkConfig::new(operator.clone(), notary)),
            progress: Arc::new(EventBusProgressSink::new(Arc::clone(&bus))),
            config: MembershipConfig {
                commit_timeout: config.commit_timeout(),
            },
        };
        let service = Arc::new(MembershipService::new(deps));

        let mut members = Vec::new();
        for (party, metadata) in config.seeded()? {
            let issued = ledger.issue_pending(party.clone(), metadata, Utc::now())?;
            log_membership_event!(
                debug,
                "bn-node",
                "Seeded membership",
                party,
                issued.state.status,
                reference = %issued.reference
            );
            members.push(party);
        }

        info!(
            node = %us,
            operator = %operator,
            members = members.len(),
            "[bn-node] Membership node ready"
        );

        Ok(Self {
            bus,
            ledger,
            identity,
            service,
            members,
        })
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    pub fn ledger(&self) -> &Arc<InMemoryLedger> {
        &self.ledger
    }

    pub fn service(&self) -> &Arc<MembershipService> {
        &self.service
    }

    pub fn identity(&self) -> &Party {
        self.identity.party()
    }

    /// Seeded parties, in configuration order.
    pub fn members(&self) -> &[Party] {
        &self.members
    }

    pub fn find_party(&self, name: &str) -> Option<&Party> {
        self.members.iter().find(|party| party.name == name)
    }

    /// Run `action` for every named party.
    ///
    /// Activations and suspensions run concurrently, one flow per party;
    /// results are reported in the order the names were given.
    pub async fn run(
        &self,
        action: NodeAction,
        names: &[String],
    ) -> Result<Vec<FlowReport>, NodeError> {
        let parties = names
            .iter()
            .map(|name| {
                self.find_party(name)
                    .cloned()
                    .ok_or_else(|| NodeError::UnknownParty(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut reports = Vec::with_capacity(parties.len());
        if action == NodeAction::Status {
            for party in parties {
                let current = self.service.current_membership(&party).await;
                reports.push(FlowReport::status(&party, current));
            }
            return Ok(reports);
        }

        let mut running = Vec::with_capacity(parties.len());
        for party in parties {
            let flow_id = Uuid::new_v4();
            // Subscribe before spawning so no step is missed
            let subscription = self.bus.subscribe(EventFilter::flow(flow_id));
            let request = match action {
                NodeAction::Suspend => FlowRequest::SuspendFor(party.clone()),
                _ => FlowRequest::ActivateFor(party.clone()),
            };
            let handle = self.service.spawn(flow_id, request);
            running.push((party, handle, subscription));
        }

        for (party, handle, mut subscription) in running {
            let flow_id = handle.flow_id();
            let outcome = handle.join().await;
            let report = FlowReport::flow(&party, flow_id, outcome, subscription.drain_flow());
            log_flow_event!(
                info,
                "bn-node",
                "Flow finished",
                flow_id,
                party = %party,
                outcome = ?report.outcome
            );
            reports.push(report);
        }
        Ok(reports)
    }

    /// Current version of every seeded membership.
    pub async fn snapshot(&self) -> Result<Vec<StateAndRef>, MembershipError> {
        current_versions(self.service.as_ref(), &self.members).await
    }
}

/// Current versions of `parties`, skipping those without a membership.
///
/// A store failure aborts the whole lookup.
async fn current_versions(
    api: &dyn MembershipApi,
    parties: &[Party],
) -> Result<Vec<StateAndRef>, MembershipError> {
    let mut current = Vec::with_capacity(parties.len());
    for party in parties {
        match api.current_membership(party).await {
            Ok(Some(version)) => current.push(version),
            Ok(None) => {}
            Err(err) => {
                warn!(party = %party, "[bn-node] Snapshot lookup failed: {}", err);
                return Err(err);
            }
        }
    }
    Ok(current)
}
