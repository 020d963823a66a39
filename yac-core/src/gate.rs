//! # Gate Adaptor
//!
//! Translates block-creator events into votes, and round-driver outcomes
//! into pipeline-facing events. This is the only module that understands
//! both "the outside world's" event shape and the round driver's; the
//! driver itself stays ignorant of where hashes come from or what
//! happens to an outcome after it's published. Grounded on this
//! codebase's `producer.rs` (subscribes upstream, republishes a
//! translated event downstream) generalized from block production to
//! consensus-gate translation.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::cluster::{Peer, PeerOrderer};
use crate::crypto::PublicKey;
use crate::hash::{HashProvider, RoundCandidate, YacHash};
use crate::outcome::Outcome;
use crate::round::Round;
use crate::vote::Vote;
use crate::yac::Yac;

const GATE_EVENT_CHANNEL_CAPACITY: usize = 64;

/// What the block-creator hands the gate adaptor for a round: either a
/// fresh candidate to vote on, or a "nothing to propose" marker.
#[derive(Debug, Clone)]
pub struct BlockCreatorEvent {
    pub ledger_peers: Vec<Peer>,
    pub round_data: Option<RoundCandidate>,
    pub round: Round,
}

/// The gate adaptor's output: the classification table from §4.7.
#[derive(Debug, Clone, PartialEq)]
pub enum GateEvent {
    /// The local peer's candidate reached commit; `block` carries the
    /// committers' signatures appended to it.
    PairValid { block: String, round: Round },
    /// The round committed to the "no data" hash.
    AgreementOnNone(Round),
    /// A different candidate than the local peer's reached commit;
    /// the surrounding pipeline should sync that block instead.
    VoteOther {
        public_keys: Vec<PublicKey>,
        model_hash: Vec<u8>,
        round: Round,
    },
    /// The round rejected, and every rejecting vote names the same
    /// proposal hash — the block itself is the disagreement.
    BlockReject(Round),
    /// The round rejected, and rejecting votes disagree on the proposal
    /// hash itself.
    ProposalReject(Round),
}

#[derive(Default)]
struct GateState {
    last_voted_round: Option<Round>,
    current_hash: Option<YacHash>,
    current_block: Option<String>,
}

/// Bridges a block-creator event source to a [`Yac`] round driver and
/// republishes its outcomes as [`GateEvent`]s.
pub struct GateAdaptor {
    yac: Arc<Yac>,
    hash_provider: Arc<dyn HashProvider>,
    peer_orderer: Arc<dyn PeerOrderer>,
    state: Mutex<GateState>,
    event_tx: broadcast::Sender<GateEvent>,
}

impl GateAdaptor {
    /// Spawns a background task that pumps `yac`'s outcome stream
    /// through [`Self::handle_outcome`] for the lifetime of the returned
    /// `Arc`.
    pub fn new(
        yac: Arc<Yac>,
        hash_provider: Arc<dyn HashProvider>,
        peer_orderer: Arc<dyn PeerOrderer>,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(GATE_EVENT_CHANNEL_CAPACITY);
        let mut outcomes = yac.on_outcome();

        let adaptor = Arc::new(Self {
            yac,
            hash_provider,
            peer_orderer,
            state: Mutex::new(GateState::default()),
            event_tx,
        });

        let adaptor_for_task = Arc::clone(&adaptor);
        tokio::spawn(async move {
            while let Ok((round, outcome)) = outcomes.recv().await {
                if let Some(event) = adaptor_for_task.handle_outcome(round, outcome) {
                    let _ = adaptor_for_task.event_tx.send(event);
                }
            }
        });

        adaptor
    }

    pub fn events(&self) -> broadcast::Receiver<GateEvent> {
        self.event_tx.subscribe()
    }

    /// Submits a block-creator event. Idempotent: an event whose round
    /// is not strictly greater than the last one voted is skipped.
    pub fn on_block_creator_event(self: &Arc<Self>, event: BlockCreatorEvent) {
        {
            let state = self.state.lock();
            if let Some(last) = state.last_voted_round {
                if event.round <= last {
                    tracing::debug!(round = %event.round, "gate: stale block-creator event, skipping");
                    return;
                }
            }
        }

        let hash = self.hash_provider.make_hash(event.round, event.round_data.as_ref());

        {
            let mut state = self.state.lock();
            state.last_voted_round = Some(event.round);
            state.current_hash = Some(hash.clone());
            state.current_block = event.round_data.map(|c| c.block);
        }

        let Some(order) = self.peer_orderer.get_ordering(&hash, event.ledger_peers) else {
            tracing::error!(round = %event.round, "gate: peer orderer returned no ordering, skipping round");
            return;
        };

        self.yac.vote(hash, order);
    }

    fn handle_outcome(&self, round: Round, outcome: Outcome) -> Option<GateEvent> {
        let (current_hash, current_block) = {
            let state = self.state.lock();
            (state.current_hash.clone(), state.current_block.clone())
        };

        let current_hash = current_hash?;
        if round < current_hash.round {
            tracing::debug!(%round, "gate: outcome older than the current round, suppressing");
            return None;
        }

        match outcome {
            Outcome::Commit { votes } => Self::classify_commit(votes, &current_hash, current_block, round, &*self.hash_provider),
            Outcome::Reject { votes } => Some(Self::classify_reject(&votes, round)),
        }
    }

    fn classify_commit(
        votes: Vec<Vote>,
        current_hash: &YacHash,
        current_block: Option<String>,
        round: Round,
        hash_provider: &dyn HashProvider,
    ) -> Option<GateEvent> {
        let winning_hash = votes.first()?.hash.clone();

        if &winning_hash == current_hash {
            if let Some(block) = current_block {
                return Some(GateEvent::PairValid {
                    block: append_signatures(block, &votes),
                    round,
                });
            }
        }

        if winning_hash.is_empty() {
            return Some(GateEvent::AgreementOnNone(round));
        }

        let public_keys = votes.iter().map(|v| v.signer().clone()).collect();
        let model_hash = hash_provider.to_model_hash(&winning_hash);
        Some(GateEvent::VoteOther {
            public_keys,
            model_hash,
            round,
        })
    }

    fn classify_reject(votes: &[Vote], round: Round) -> GateEvent {
        let all_same_proposal = votes
            .windows(2)
            .all(|pair| pair[0].hash.proposal_hash == pair[1].hash.proposal_hash);

        if all_same_proposal {
            GateEvent::BlockReject(round)
        } else {
            GateEvent::ProposalReject(round)
        }
    }
}

/// Placeholder wire representation: the core has no structured block
/// type of its own (§1), so committers' signatures are appended as a
/// suffix a real pipeline's block type would parse back out.
fn append_signatures(block: String, votes: &[Vote]) -> String {
    let signatures: Vec<String> = votes.iter().map(|v| hex::encode(v.signature.bytes)).collect();
    format!("{block}|signatures={}", signatures.join(","))
}
