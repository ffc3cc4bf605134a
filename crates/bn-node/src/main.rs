//! # BN Node
//!
//! Runs business network membership flows from the command line and prints
//! one JSON report per party.
//!
//! ```text
//! bn-node --config bn-node.example.toml activate "O=PartyA,L=London,C=GB"
//! bn-node --config bn-node.example.toml demo --metrics
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use bn_node::{FlowReport, MembershipNode, NodeAction, NodeConfig};
use bn_telemetry::{encode_metrics, init_logging, log_event, TelemetryConfig};

/// BN Node: business network membership management
#[derive(Parser, Debug)]
#[command(name = "bn-node")]
#[command(about = "Activate, suspend and inspect business network memberships")]
struct Args {
    /// TOML configuration file (falls back to BN_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics after the command
    #[arg(short, long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Activate the memberships of the named parties
    Activate { parties: Vec<String> },
    /// Suspend the memberships of the named parties
    Suspend { parties: Vec<String> },
    /// Show current memberships (all seeded parties when none are named)
    Status { parties: Vec<String> },
    /// Activate every seeded membership twice, then suspend the first
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let telemetry = TelemetryConfig::from_env();
    init_logging(&telemetry).context("failed to initialise logging")?;

    let config =
        NodeConfig::from_env(args.config.as_deref()).context("failed to load configuration")?;
    log_event!(
        info,
        "bn-node",
        "Configuration loaded",
        node = %config.node.name,
        members = config.memberships.len()
    );
    let node = MembershipNode::new(&config).context("failed to start membership node")?;
    let everyone: Vec<String> = node.members().iter().map(|p| p.name.clone()).collect();

    let or_everyone = |names: Vec<String>| {
        if names.is_empty() {
            everyone.clone()
        } else {
            names
        }
    };

    let reports = match args.command {
        Command::Activate { parties } => node.run(NodeAction::Activate, &parties).await?,
        Command::Suspend { parties } => node.run(NodeAction::Suspend, &parties).await?,
        Command::Status { parties } => {
            node.run(NodeAction::Status, &or_everyone(parties)).await?
        }
        Command::Demo => demo(&node, &everyone).await?,
    };

    println!("{}", serde_json::to_string_pretty(&reports)?);

    if args.metrics {
        print!("{}", encode_metrics().context("failed to encode metrics")?);
    }
    Ok(())
}

async fn demo(node: &MembershipNode, everyone: &[String]) -> Result<Vec<FlowReport>> {
    info!(members = everyone.len(), "🚀 [bn-node] Running demo");
    let mut reports = node.run(NodeAction::Activate, everyone).await?;
    // Second pass must be a no-op for every party
    reports.extend(node.run(NodeAction::Activate, everyone).await?);
    if let Some(first) = everyone.first() {
        reports.extend(node.run(NodeAction::Suspend, &[first.clone()]).await?);
    }
    reports.extend(node.run(NodeAction::Status, everyone).await?);
    Ok(reports)
}
