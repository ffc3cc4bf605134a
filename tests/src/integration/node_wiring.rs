//! # Node Wiring
//!
//! Builds `MembershipNode` from configuration text the way `bn-node` does
//! and checks the reports it prints.

#[cfg(test)]
mod tests {
    use bn_membership::{MembershipApi, MembershipStatus};
    use bn_node::{MembershipNode, NodeAction, NodeConfig, NodeError, Outcome};
    use shared_bus::{BusEvent, EventFilter, EventSubscriber, EventTopic};
    use shared_types::ProgressStep;

    const CONFIG: &str = r#"
[node]
name = "O=BNO,L=New York,C=US"
seed = "0707070707070707070707070707070707070707070707070707070707070707"
commit_timeout_secs = 5

[[memberships]]
name = "O=PartyA,L=London,C=GB"
key = "0101010101010101010101010101010101010101010101010101010101010101"
metadata = { role = "bank", region = "EU" }

[[memberships]]
name = "O=PartyB,L=Tokyo,C=JP"
key = "0202020202020202020202020202020202020202020202020202020202020202"

[[memberships]]
name = "O=PartyC,L=Sydney,C=AU"
key = "0303030303030303030303030303030303030303030303030303030303030303"
"#;

    const PARTY_A: &str = "O=PartyA,L=London,C=GB";

    fn node() -> MembershipNode {
        MembershipNode::new(&NodeConfig::parse(CONFIG).unwrap()).unwrap()
    }

    fn all(node: &MembershipNode) -> Vec<String> {
        node.members().iter().map(|p| p.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_status_lists_every_seeded_member_as_pending() {
        let node = node();
        let reports = node.run(NodeAction::Status, &all(&node)).await.unwrap();

        assert_eq!(reports.len(), 3);
        for report in &reports {
            assert_eq!(report.outcome, Outcome::Current);
            assert_eq!(report.status.as_deref(), Some("PENDING"));
            assert!(report.flow_id.is_none());
        }
    }

    #[tokio::test]
    async fn test_activate_then_suspend_round() {
        let node = node();
        let everyone = all(&node);

        let activated = node.run(NodeAction::Activate, &everyone).await.unwrap();
        assert!(activated.iter().all(|r| r.outcome == Outcome::Committed));

        let repeated = node.run(NodeAction::Activate, &everyone).await.unwrap();
        assert!(repeated.iter().all(|r| r.outcome == Outcome::Unchanged));
        let already_active = Some(ProgressStep::AlreadyActive.label());
        assert!(repeated
            .iter()
            .all(|r| r.steps.last().map(String::as_str) == already_active));

        let suspended = node
            .run(NodeAction::Suspend, &[PARTY_A.to_string()])
            .await
            .unwrap();
        assert_eq!(suspended[0].outcome, Outcome::Committed);
        assert_eq!(suspended[0].status.as_deref(), Some("SUSPENDED"));

        // One transaction per committed change
        assert_eq!(node.ledger().transactions().len(), 4);

        let party = node.find_party(PARTY_A).unwrap().clone();
        let current = node
            .service()
            .current_membership(&party)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.state.status, MembershipStatus::Suspended);
        assert_eq!(
            current.state.metadata.get("region").map(String::as_str),
            Some("EU")
        );
    }

    #[tokio::test]
    async fn test_reactivating_suspended_member_fails_with_report() {
        let node = node();
        let party = vec![PARTY_A.to_string()];
        node.run(NodeAction::Suspend, &party).await.unwrap();

        let reports = node.run(NodeAction::Activate, &party).await.unwrap();
        assert_eq!(reports[0].outcome, Outcome::Failed);
        assert!(reports[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("Invalid transition")));
    }

    #[tokio::test]
    async fn test_node_announces_changes_on_its_bus() {
        let node = node();
        let mut changes = node
            .bus()
            .subscribe(EventFilter::topics(vec![EventTopic::Membership]));

        let reports = node
            .run(NodeAction::Activate, &[PARTY_A.to_string()])
            .await
            .unwrap();

        let events = changes.drain();
        assert_eq!(events.len(), 1);
        match &events[0] {
            BusEvent::MembershipActivated {
                party,
                transaction_id,
            } => {
                assert_eq!(party.name, PARTY_A);
                assert_eq!(
                    reports[0].transaction_id.as_deref(),
                    Some(hex_encode(transaction_id).as_str())
                );
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reports_serialize_as_json() {
        let node = node();
        let reports = node
            .run(NodeAction::Activate, &[PARTY_A.to_string()])
            .await
            .unwrap();
        let json = serde_json::to_value(&reports).unwrap();

        assert_eq!(json[0]["outcome"], "committed");
        assert_eq!(json[0]["status"], "ACTIVE");
        assert_eq!(json[0]["record"]["metadata"]["role"], "bank");
        assert_eq!(json[0]["steps"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn test_unknown_party_stops_the_whole_command() {
        let node = node();
        let err = node
            .run(
                NodeAction::Activate,
                &[PARTY_A.to_string(), "O=Ghost,L=Nowhere,C=XX".to_string()],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::UnknownParty(name) if name.starts_with("O=Ghost")));
        assert!(node.ledger().transactions().is_empty());
    }

    #[test]
    fn test_duplicate_seed_fails_start_up() {
        let doubled = format!(
            "{CONFIG}\n[[memberships]]\nname = \"{PARTY_A}\"\nkey = \"{}\"\n",
            "01".repeat(32)
        );
        let config = NodeConfig::parse(&doubled).unwrap();
        assert!(matches!(
            MembershipNode::new(&config),
            Err(NodeError::Seed(_))
        ));
    }

    fn hex_encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}
