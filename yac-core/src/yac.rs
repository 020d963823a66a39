//! # Round Driver
//!
//! `Yac` is the whole consensus gate in one struct: a single mutex
//! guarding the cluster ordering, the current round, the cleanup
//! strategy and the Vote Storage; a timer for leader-rotation delay; and
//! an outcome channel the gate adaptor subscribes to. Grounded on this
//! codebase's `consensus_loop.rs` run-loop shape (single owned state,
//! `tokio::select!`-driven suspension, fire-and-forget sends out to the
//! network layer) generalized from a block-production loop to a voting
//! state machine.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::cleanup::BufferedCleanupStrategy;
use crate::cluster::{ClusterOrdering, Peer};
use crate::config::YacConfig;
use crate::consistency::SupermajorityChecker;
use crate::crypto::{CryptoProvider, PublicKey};
use crate::hash::YacHash;
use crate::outcome::Outcome;
use crate::round::Round;
use crate::storage::propagation_state::PropagationState;
use crate::storage::vote_storage::VoteStorage;
use crate::timer::Timer;
use crate::transport::Transport;
use crate::vote::Vote;

/// Capacity of the outcome broadcast channel. Generous relative to any
/// realistic number of concurrent subscribers; a slow subscriber drops
/// the oldest outcome rather than stalling the driver.
const OUTCOME_CHANNEL_CAPACITY: usize = 64;

struct YacState {
    cluster_order: ClusterOrdering,
    round: Round,
    vote_storage: VoteStorage,
    cleanup: BufferedCleanupStrategy,
}

/// The round driver. Always held behind an `Arc` — its methods spawn
/// tasks that outlive any single call and need to keep the driver alive.
pub struct Yac {
    state: Mutex<YacState>,
    config: YacConfig,
    transport: Arc<dyn Transport>,
    crypto: Arc<dyn CryptoProvider>,
    timer: Arc<Timer>,
    outcome_tx: broadcast::Sender<(Round, Outcome)>,
}

impl Yac {
    pub fn new(
        config: YacConfig,
        transport: Arc<dyn Transport>,
        crypto: Arc<dyn CryptoProvider>,
        initial_order: ClusterOrdering,
    ) -> Arc<Self> {
        let (outcome_tx, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        let vote_storage = VoteStorage::new(SupermajorityChecker::new(config.consistency_model));
        let timer = Timer::new(config.vote_delay);

        Arc::new(Self {
            state: Mutex::new(YacState {
                cluster_order: initial_order,
                round: Round::genesis(),
                vote_storage,
                cleanup: BufferedCleanupStrategy::new(),
            }),
            config,
            transport,
            crypto,
            timer,
            outcome_tx,
        })
    }

    pub fn config(&self) -> &YacConfig {
        &self.config
    }

    pub fn local_public_key(&self) -> PublicKey {
        self.crypto.public_key()
    }

    /// A fresh receiver for every `Commit`/`Reject` this driver publishes
    /// from here on. Past outcomes are not replayed.
    pub fn on_outcome(&self) -> broadcast::Receiver<(Round, Outcome)> {
        self.outcome_tx.subscribe()
    }

    /// Rounds this driver currently holds any evidence for. Exposed for
    /// tests and the demo binary; not part of the consensus contract.
    pub fn known_rounds(&self) -> Vec<Round> {
        self.state.lock().vote_storage.known_rounds().collect()
    }

    pub fn is_committed(&self, round: Round) -> bool {
        self.state.lock().vote_storage.is_committed(round)
    }

    /// Called by the gate adaptor once per round: adopts `order` as the
    /// round's cluster ordering, signs `hash` locally, and begins the
    /// leader-rotation voting loop.
    pub fn vote(self: &Arc<Self>, hash: YacHash, order: ClusterOrdering) {
        let local_vote = self.crypto.get_vote(hash.clone());
        {
            let mut state = self.state.lock();
            state.cluster_order = order;
            state.round = hash.round;
        }
        self.voting_step(local_vote);
    }

    /// One hop of leader rotation: send the vote to the current leader,
    /// advance the ordering, and — if a next peer remains — reschedule
    /// itself after the configured delay. Stops immediately if the
    /// round has already committed.
    fn voting_step(self: &Arc<Self>, vote: Vote) {
        let (leader, reschedule) = {
            let mut state = self.state.lock();
            if state.vote_storage.is_committed(vote.hash.round) {
                return;
            }
            let leader = state.cluster_order.current_leader().clone();
            state.cluster_order.switch_to_next();
            (leader, state.cluster_order.has_next())
        };

        self.spawn_send(leader, vec![vote.clone()]);

        if reschedule {
            let this = Arc::clone(self);
            self.timer.invoke_after_delay(move || this.voting_step(vote));
        }
    }

    /// Called by the transport on every received batch: filters unknown
    /// peers, verifies the remaining batch's signatures, and — if both
    /// checks pass — applies it to the Vote Storage under the lock.
    pub fn on_state(self: &Arc<Self>, incoming_votes: Vec<Vote>) {
        let mut state = self.state.lock();

        let known: Vec<Vote> = incoming_votes
            .into_iter()
            .filter(|vote| {
                state
                    .cluster_order
                    .peers()
                    .iter()
                    .any(|peer| &peer.public_key == vote.signer())
            })
            .collect();

        if known.is_empty() {
            tracing::warn!("on_state: entire batch was from unknown peer(s), dropping");
            return;
        }

        if !self.crypto.verify(&known) {
            tracing::warn!(batch_len = known.len(), "on_state: signature verification failed, dropping batch");
            return;
        }

        self.apply_state(&mut state, known);
    }

    /// Given a filtered, verified batch and the held lock: stores it,
    /// then either attempts back-propagation (no new outcome, single
    /// vote) or drives the propagation state machine (new outcome).
    fn apply_state(self: &Arc<Self>, state: &mut YacState, batch: Vec<Vote>) {
        let Some(first) = batch.first() else {
            return;
        };
        let round = first.hash.round;
        let sender = first.signer().clone();
        let batch_len = batch.len();

        if !state.vote_storage.contains_round(round) && !state.cleanup.should_create_round(round) {
            tracing::debug!(%round, "apply_state: round already evicted, dropping batch");
            return;
        }

        let peers_in_round = state.cluster_order.len();
        let outcome = match state.vote_storage.store(batch, peers_in_round) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(%err, "apply_state: vote storage rejected batch");
                return;
            }
        };

        let Some(outcome) = outcome else {
            if batch_len == 1 {
                self.try_back_propagate(state, round, &sender);
            }
            return;
        };

        // Batch size heuristic: a multi-vote batch that produced this
        // outcome means another peer already broadcast it. Skip straight
        // past the broadcast stage.
        if batch_len > 1 && state.vote_storage.processing_state(round) == PropagationState::NotSentNotProcessed {
            state.vote_storage.advance_processing_state(round);
        }

        match state.vote_storage.processing_state(round) {
            PropagationState::NotSentNotProcessed => {
                if let Some(drained) = state.cleanup.finalize(round, &outcome) {
                    state.vote_storage.remove_rounds(&drained);
                }
                state.vote_storage.advance_processing_state(round);
                self.broadcast_outcome(state, round, &outcome);
            }
            PropagationState::SentNotProcessed => {
                state.vote_storage.advance_processing_state(round);
                if round >= state.round {
                    self.timer.deny();
                }
                let _ = self.outcome_tx.send((round, outcome));
            }
            PropagationState::SentProcessed => {
                // A peer re-arriving after we've already published;
                // give it direct evidence the same way back-propagation
                // would, restricted to single-vote batches per the
                // back-propagation heuristic above.
                if batch_len == 1 {
                    self.try_back_propagate(state, round, &sender);
                }
            }
        }
    }

    /// Serves a lagging peer directly: if `round` is at or behind the
    /// last finalized round, hand its sender the stored outcome's votes.
    fn try_back_propagate(self: &Arc<Self>, state: &YacState, round: Round, sender: &PublicKey) {
        let Some(last_finalized) = state.vote_storage.last_finalized_round() else {
            return;
        };
        if round > last_finalized {
            return;
        }
        let Some(peer) = state.cluster_order.peers().iter().find(|p| &p.public_key == sender) else {
            return;
        };
        let Some(outcome) = state.vote_storage.state(last_finalized) else {
            return;
        };
        self.spawn_send(peer.clone(), outcome.votes().to_vec());
    }

    fn broadcast_outcome(self: &Arc<Self>, state: &YacState, round: Round, outcome: &Outcome) {
        tracing::debug!(%round, peers = state.cluster_order.len(), "broadcasting outcome to cluster");
        for peer in state.cluster_order.peers() {
            self.spawn_send(peer.clone(), outcome.votes().to_vec());
        }
    }

    /// Fire-and-forget send: spawns so the driver never awaits transport
    /// I/O while holding (or having just held) its lock.
    fn spawn_send(self: &Arc<Self>, peer: Peer, votes: Vec<Vote>) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            transport.send_state(&peer, votes).await;
        });
    }
}
