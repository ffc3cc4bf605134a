//! # Membership Flows over the Shared Bus
//!
//! Runs the membership service against the in-memory ledger with progress
//! published through `EventBusProgressSink`, and checks what subscribers
//! observe.
//!
//! ```text
//! MembershipService ──step/failed/committed──→ EventBusProgressSink ──→ InMemoryEventBus
//!        │                                                                   │
//!        └──finalize──→ InMemoryLedger                          Subscription (per flow / topic)
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bn_membership::adapters::{
        EventBusProgressSink, InMemoryLedger, LocalIdentity, StaticNetworkConfig,
    };
    use bn_membership::domain::{TransactionBuilder, TransactionSignature};
    use bn_membership::ports::outbound::{FinalityGateway, TransactionSigner};
    use bn_membership::{
        Command, CommitError, FlowRequest, MembershipApi, MembershipConfig,
        MembershipDependencies, MembershipError, MembershipMetadata, MembershipService,
        SignedTransaction, StateAndRef,
    };
    use chrono::Utc;
    use shared_bus::{BusEvent, EventFilter, EventSubscriber, EventTopic, InMemoryEventBus};
    use shared_crypto::Ed25519KeyPair;
    use shared_types::{Party, ProgressStep, Signature};
    use tokio::time::timeout;
    use tokio_stream::StreamExt;
    use uuid::Uuid;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Network {
        bus: Arc<InMemoryEventBus>,
        ledger: Arc<InMemoryLedger>,
        identity: Arc<LocalIdentity>,
    }

    fn notary() -> Party {
        Party::new("O=Notary,L=Zurich,C=CH", [5u8; 32]).unwrap()
    }

    fn member(name: &str, key: u8) -> Party {
        Party::new(name, [key; 32]).unwrap()
    }

    impl Network {
        fn new() -> Self {
            let identity =
                LocalIdentity::new("O=BNO,L=New York,C=US", Ed25519KeyPair::from_seed([7u8; 32]))
                    .unwrap();
            Self {
                bus: Arc::new(InMemoryEventBus::new()),
                ledger: Arc::new(InMemoryLedger::new(notary(), identity.party().clone())),
                identity: Arc::new(identity),
            }
        }

        fn service_run_by(&self, operator: Party) -> Arc<MembershipService> {
            Arc::new(MembershipService::new(MembershipDependencies {
                store: self.ledger.clone(),
                finality: self.ledger.clone(),
                signer: self.identity.clone(),
                identity: self.identity.clone(),
                network: Arc::new(StaticNetworkConfig::new(operator, notary())),
                progress: Arc::new(EventBusProgressSink::new(Arc::clone(&self.bus))),
                config: MembershipConfig::default(),
            }))
        }

        fn service(&self) -> Arc<MembershipService> {
            self.service_run_by(self.identity.party().clone())
        }

        fn onboard(&self, party: &Party) -> StateAndRef {
            self.ledger
                .issue_pending(party.clone(), MembershipMetadata::new(), Utc::now())
                .unwrap()
        }
    }

    fn progress_steps(events: &[BusEvent]) -> Vec<ProgressStep> {
        events
            .iter()
            .filter_map(|event| match event {
                BusEvent::FlowProgress { step, .. } => Some(*step),
                _ => None,
            })
            .collect()
    }

    // =============================================================================
    // PROGRESS EVENTS
    // =============================================================================

    #[tokio::test]
    async fn test_activation_progress_reaches_flow_subscriber() {
        let net = Network::new();
        let party = member("O=PartyA,L=London,C=GB", 1);
        net.onboard(&party);
        let service = net.service();

        let flow_id = Uuid::new_v4();
        let mut sub = net.bus.subscribe(EventFilter::flow(flow_id));
        let committed = service
            .execute(flow_id, FlowRequest::ActivateFor(party.clone()))
            .await
            .unwrap();

        assert_eq!(committed.flow_id, flow_id);
        assert_eq!(
            progress_steps(&sub.drain()),
            vec![
                ProgressStep::VerifyingOperator,
                ProgressStep::LookingForMembershipState,
                ProgressStep::ActivatingTheMembershipState,
                ProgressStep::Activating,
                ProgressStep::Activated,
            ]
        );
    }

    #[tokio::test]
    async fn test_committed_change_is_announced_with_transaction_id() {
        let net = Network::new();
        let party = member("O=PartyA,L=London,C=GB", 1);
        net.onboard(&party);
        let service = net.service();

        let mut changes = net
            .bus
            .event_stream(EventFilter::topics(vec![EventTopic::Membership]));
        let committed = service.activate_for(&party).await.unwrap();

        let event = timeout(Duration::from_secs(1), changes.next())
            .await
            .expect("announcement should arrive")
            .expect("bus should stay open");
        assert_eq!(
            event,
            BusEvent::MembershipActivated {
                party: party.clone(),
                transaction_id: committed.transaction_id().unwrap(),
            }
        );

        service.suspend_for(&party).await.unwrap();
        let event = timeout(Duration::from_secs(1), changes.next())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, BusEvent::MembershipSuspended { party: p, .. } if p == party));
    }

    #[tokio::test]
    async fn test_noop_activation_announces_nothing() {
        let net = Network::new();
        let party = member("O=PartyA,L=London,C=GB", 1);
        net.onboard(&party);
        let service = net.service();
        service.activate_for(&party).await.unwrap();

        let mut changes = net
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Membership]));
        let flow_id = Uuid::new_v4();
        let mut progress = net.bus.subscribe(EventFilter::flow(flow_id));
        let again = service
            .execute(flow_id, FlowRequest::ActivateFor(party.clone()))
            .await
            .unwrap();

        assert!(again.is_unchanged());
        assert!(changes.drain().is_empty());
        assert_eq!(
            progress_steps(&progress.drain()).last(),
            Some(&ProgressStep::AlreadyActive)
        );
    }

    #[tokio::test]
    async fn test_rejected_caller_publishes_failure_at_guard() {
        let net = Network::new();
        let party = member("O=PartyA,L=London,C=GB", 1);
        net.onboard(&party);
        let service = net.service_run_by(member("O=OtherBNO,L=Paris,C=FR", 9));

        let flow_id = Uuid::new_v4();
        let mut sub = net.bus.subscribe(EventFilter::flow(flow_id));
        let err = service
            .execute(flow_id, FlowRequest::ActivateFor(party.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err.kind(), MembershipError::NotAuthorized { .. }));
        let events = sub.drain();
        assert_eq!(progress_steps(&events), vec![ProgressStep::VerifyingOperator]);
        assert!(matches!(
            events.last(),
            Some(BusEvent::FlowFailed { step: ProgressStep::VerifyingOperator, .. })
        ));
        assert!(net.ledger.transactions().is_empty());
    }

    // =============================================================================
    // LEDGER LINEAGE
    // =============================================================================

    #[tokio::test]
    async fn test_lineage_is_chained_and_verifiable() {
        let net = Network::new();
        let party = member("O=PartyA,L=London,C=GB", 1);
        let issued = net.onboard(&party);
        let service = net.service();

        let activated = service.activate_for(&party).await.unwrap();
        let suspended = service.suspend_for(&party).await.unwrap();

        let history = net.ledger.history(&issued.state.linear_id);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], issued);
        assert_eq!(history[1], activated.record);
        assert_eq!(history[2], suspended.record);
        for pair in history.windows(2) {
            assert_eq!(pair[1].state.previous_version, Some(pair[0].reference));
            assert!(pair[1].state.modified >= pair[0].state.modified);
            assert_eq!(pair[1].state.issued, issued.state.issued);
        }

        for tx in net.ledger.transactions() {
            tx.verify_required_signatures().unwrap();
            assert_eq!(tx.tx.notary, notary());
        }
        let commands: Vec<Command> = net
            .ledger
            .transactions()
            .iter()
            .map(|tx| tx.tx.command)
            .collect();
        assert_eq!(commands, vec![Command::Activate, Command::Suspend]);
    }

    #[tokio::test]
    async fn test_suspended_member_cannot_be_reactivated() {
        let net = Network::new();
        let party = member("O=PartyA,L=London,C=GB", 1);
        net.onboard(&party);
        let service = net.service();
        service.suspend_for(&party).await.unwrap();

        let err = service.activate_for(&party).await.unwrap_err();
        assert!(matches!(err.kind(), MembershipError::InvalidTransition { .. }));
        assert_eq!(net.ledger.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_tampered_signature_is_rejected_by_ledger() {
        let net = Network::new();
        let party = member("O=PartyA,L=London,C=GB", 1);
        let issued = net.onboard(&party);

        let output = issued.state.supersede(
            issued.reference,
            bn_membership::MembershipStatus::Active,
            Utc::now(),
        );
        let mut builder = TransactionBuilder::new(notary());
        builder
            .add_input_state(&issued)
            .add_output_state(output)
            .add_command(Command::Activate, net.identity.party().owning_key);
        let wire = builder.to_wire_transaction().unwrap();
        let signature = net.identity.sign(&wire).await.unwrap();

        let mut bytes = signature.signature.0;
        bytes[0] ^= 0xff;
        let forged = SignedTransaction::new(
            wire,
            TransactionSignature {
                by: signature.by,
                signature: Signature(bytes),
            },
        );

        let err = net.ledger.finalize(forged).await.unwrap_err();
        assert!(matches!(err, CommitError::Rejected { .. }));
        assert!(net.ledger.transactions().is_empty());
        assert_eq!(
            net.ledger.history(&issued.state.linear_id),
            vec![issued.clone()]
        );
    }

    #[tokio::test]
    async fn test_node_posing_as_operator_cannot_commit() {
        let net = Network::new();
        let party = member("O=PartyA,L=London,C=GB", 1);
        let issued = net.onboard(&party);

        // A member node sharing the ledger, configured to trust itself
        let impostor = Arc::new(
            LocalIdentity::new("O=PartyB,L=Tokyo,C=JP", Ed25519KeyPair::from_seed([8u8; 32]))
                .unwrap(),
        );
        let service = MembershipService::new(MembershipDependencies {
            store: net.ledger.clone(),
            finality: net.ledger.clone(),
            signer: impostor.clone(),
            identity: impostor.clone(),
            network: Arc::new(StaticNetworkConfig::new(impostor.party().clone(), notary())),
            progress: Arc::new(EventBusProgressSink::new(Arc::clone(&net.bus))),
            config: MembershipConfig::default(),
        });

        let err = service.activate_for(&party).await.unwrap_err();
        assert!(matches!(err.commit_error(), Some(CommitError::Rejected { .. })));
        assert!(net.ledger.transactions().is_empty());
        assert_eq!(service.current_membership(&party).await.unwrap(), Some(issued));
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_members_activate_in_parallel() {
        let net = Network::new();
        let parties: Vec<Party> = (1..=8u8)
            .map(|i| member(&format!("O=Party{i},L=London,C=GB"), i))
            .collect();
        for party in &parties {
            net.onboard(party);
        }
        let service = net.service();

        let handles: Vec<_> = parties
            .iter()
            .map(|party| service.spawn(Uuid::new_v4(), FlowRequest::ActivateFor(party.clone())))
            .collect();
        for handle in handles {
            let committed = handle.join().await.unwrap();
            assert!(committed.record.state.is_active());
        }

        assert_eq!(net.ledger.transactions().len(), parties.len());
        for party in &parties {
            let current = service.current_membership(party).await.unwrap().unwrap();
            assert!(current.state.is_active());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_activations_of_one_member_commit_once() {
        let net = Network::new();
        let party = member("O=PartyA,L=London,C=GB", 1);
        net.onboard(&party);
        let service = net.service();

        let handles: Vec<_> = (0..6)
            .map(|_| service.spawn(Uuid::new_v4(), FlowRequest::ActivateFor(party.clone())))
            .collect();
        let mut committed = 0;
        for handle in handles {
            match handle.join().await {
                Ok(record) if !record.is_unchanged() => committed += 1,
                // Lost the race after the winner committed, or saw it already active
                Ok(_) => {}
                Err(bn_membership::FlowJoinError::Failed(err)) => {
                    assert!(matches!(err.commit_error(), Some(CommitError::Conflict { .. })));
                }
                Err(other) => panic!("unexpected flow error: {other}"),
            }
        }

        assert_eq!(committed, 1);
        assert_eq!(net.ledger.transactions().len(), 1);
    }
}
