// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # YAC Demo Node
//!
//! Entry point for the `yac-node` binary. Wires a handful of in-process
//! [`yac_core::Yac`] instances together with the reference transport, peer
//! orderer, hash provider and crypto provider, drives a synthetic
//! block-creator event source across a configurable number of rounds, and
//! logs the gate outcome each round settles on.
//!
//! There is no RPC surface, no metrics endpoint, and nothing is persisted
//! across runs — every peer lives and dies with this process.

mod cli;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::timeout;

use yac_core::cluster::{ClusterOrdering, DeterministicPeerOrderer, Peer};
use yac_core::config::YacConfig;
use yac_core::consistency::ConsistencyModel;
use yac_core::crypto::{CryptoProvider, Ed25519CryptoProvider};
use yac_core::gate::{BlockCreatorEvent, GateAdaptor, GateEvent};
use yac_core::hash::{Blake3HashProvider, RoundCandidate};
use yac_core::round::Round;
use yac_core::transport::{InProcessTransport, Transport};
use yac_core::yac::Yac;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::YacNodeCli::parse();
    match cli.command {
        cli::Commands::Run(args) => run_demo(args).await,
        cli::Commands::Version => {
            println!("yac-node {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_demo(args: cli::RunArgs) -> Result<()> {
    let format = logging::LogFormat::from_str_lossy(&args.log_format);
    let filter = format!("yac_node={level},yac_core={level}", level = args.log_level);
    logging::init_logging(&filter, format);

    let model = parse_consistency(&args.consistency)?;
    anyhow::ensure!(args.peers > 0, "peers must be at least 1");
    anyhow::ensure!(args.rounds > 0, "rounds must be at least 1");

    tracing::info!(peers = args.peers, rounds = args.rounds, ?model, "starting demo cluster");

    let transport = InProcessTransport::new();
    let cryptos: Vec<Arc<Ed25519CryptoProvider>> =
        (0..args.peers).map(|_| Arc::new(Ed25519CryptoProvider::generate())).collect();
    let peers: Vec<Peer> = cryptos
        .iter()
        .enumerate()
        .map(|(i, c)| Peer::new(format!("peer-{i}"), c.public_key()))
        .collect();

    let config = YacConfig::new(model, Duration::from_millis(args.vote_delay_ms));

    let mut gates = Vec::with_capacity(peers.len());
    for crypto in &cryptos {
        let order = ClusterOrdering::create(peers.clone()).context("building initial cluster ordering")?;
        let yac = Yac::new(
            config.clone(),
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(crypto) as Arc<dyn CryptoProvider>,
            order,
        );
        transport.register(crypto.public_key(), &yac);
        gates.push(GateAdaptor::new(yac, Arc::new(Blake3HashProvider), Arc::new(DeterministicPeerOrderer)));
    }

    // Every honest peer settles on the same outcome; watching the first is
    // enough for a demo.
    let mut events = gates[0].events();

    for round_index in 1..=args.rounds {
        let round = Round::new(round_index, 1);
        let candidate = RoundCandidate {
            proposal: format!("proposal-{round_index}"),
            block: format!("block-{round_index}"),
        };

        for gate in &gates {
            gate.on_block_creator_event(BlockCreatorEvent {
                ledger_peers: peers.clone(),
                round_data: Some(candidate.clone()),
                round,
            });
        }

        match timeout(Duration::from_secs(5), events.recv()).await {
            Ok(Ok(event)) => log_outcome(round, event),
            Ok(Err(_)) => tracing::warn!(%round, "event channel closed early"),
            Err(_) => tracing::warn!(%round, "round did not settle within the timeout"),
        }
    }

    Ok(())
}

fn parse_consistency(s: &str) -> Result<ConsistencyModel> {
    match s.to_lowercase().as_str() {
        "cft" => Ok(ConsistencyModel::Cft),
        "bft" => Ok(ConsistencyModel::Bft),
        other => anyhow::bail!("unknown consistency model '{other}', expected \"cft\" or \"bft\""),
    }
}

fn log_outcome(round: Round, event: GateEvent) {
    match event {
        GateEvent::PairValid { block, .. } => {
            tracing::info!(%round, %block, "round committed the local candidate")
        }
        GateEvent::AgreementOnNone(_) => {
            tracing::info!(%round, "round committed agreement on no data")
        }
        GateEvent::VoteOther { public_keys, .. } => {
            tracing::info!(%round, voters = public_keys.len(), "round committed a different candidate than the local one")
        }
        GateEvent::BlockReject(_) => tracing::info!(%round, "round rejected on the block"),
        GateEvent::ProposalReject(_) => tracing::info!(%round, "round rejected on the proposal itself"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_consistency_accepts_known_models_case_insensitively() {
        assert_eq!(parse_consistency("cft").unwrap(), ConsistencyModel::Cft);
        assert_eq!(parse_consistency("BFT").unwrap(), ConsistencyModel::Bft);
    }

    #[test]
    fn parse_consistency_rejects_unknown_models() {
        assert!(parse_consistency("paxos").is_err());
    }

    #[tokio::test]
    async fn run_demo_settles_every_requested_round() {
        let args = cli::RunArgs {
            peers: 4,
            rounds: 3,
            consistency: "cft".into(),
            vote_delay_ms: 20,
            log_level: "error".into(),
            log_format: "pretty".into(),
        };
        run_demo(args).await.unwrap();
    }
}
