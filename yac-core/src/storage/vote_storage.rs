//! # Vote Storage
//!
//! Indexes [`ProposalStorage`]s by round and tracks each round's
//! [`PropagationState`]. This is the entry point the round driver calls
//! on every incoming (already filtered and verified) vote batch.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::consistency::SupermajorityChecker;
use crate::error::YacError;
use crate::outcome::Outcome;
use crate::round::Round;
use crate::storage::propagation_state::PropagationState;
use crate::storage::proposal_storage::ProposalStorage;
use crate::vote::Vote;

/// Per-round index of [`ProposalStorage`]s plus propagation state.
#[derive(Debug)]
pub struct VoteStorage {
    checker: SupermajorityChecker,
    proposals: HashMap<Round, ProposalStorage>,
    propagation: HashMap<Round, PropagationState>,
}

impl VoteStorage {
    pub fn new(checker: SupermajorityChecker) -> Self {
        Self {
            checker,
            proposals: HashMap::new(),
            propagation: HashMap::new(),
        }
    }

    /// Locates or lazily creates the `ProposalStorage` for
    /// `votes[0].hash.round`, then delegates the whole batch to it.
    ///
    /// `peers_in_round` is only consulted the first time a round's
    /// storage is created. A later call for the same round with a
    /// different value is a contract violation from the caller (the
    /// round driver should always pass `cluster_order.len()` for the
    /// round currently in flight) and returns
    /// [`YacError::PeerCountMismatch`] instead of silently keeping the
    /// original value.
    pub fn store(&mut self, votes: Vec<Vote>, peers_in_round: usize) -> Result<Option<Outcome>, YacError> {
        let round = votes.first().ok_or(YacError::EmptyVoteBatch)?.hash.round;
        let checker = self.checker;

        let proposal = match self.proposals.entry(round) {
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                if existing.peers_in_round() != peers_in_round {
                    return Err(YacError::PeerCountMismatch {
                        round,
                        expected: existing.peers_in_round(),
                        actual: peers_in_round,
                    });
                }
                existing
            }
            Entry::Vacant(entry) => entry.insert(ProposalStorage::new(round, peers_in_round, checker)),
        };

        Ok(proposal.insert_batch(votes))
    }

    pub fn is_committed(&self, round: Round) -> bool {
        self.proposals
            .get(&round)
            .and_then(|p| p.state())
            .map(|o| o.is_commit())
            .unwrap_or(false)
    }

    pub fn state(&self, round: Round) -> Option<Outcome> {
        self.proposals.get(&round).and_then(|p| p.state())
    }

    /// Unknown rounds default to `NotSentNotProcessed`.
    pub fn processing_state(&self, round: Round) -> PropagationState {
        self.propagation.get(&round).copied().unwrap_or_default()
    }

    pub fn advance_processing_state(&mut self, round: Round) {
        let next = self.processing_state(round).advance();
        self.propagation.insert(round, next);
    }

    /// The maximum round observed with any recorded outcome — used to
    /// answer lagging peers via back-propagation.
    pub fn last_finalized_round(&self) -> Option<Round> {
        self.proposals
            .iter()
            .filter(|(_, p)| p.state().is_some())
            .map(|(round, _)| *round)
            .max()
    }

    /// Removes every round in `rounds` from both indices. Called after
    /// the cleanup strategy authorizes eviction.
    pub fn remove_rounds(&mut self, rounds: &[Round]) {
        for round in rounds {
            self.proposals.remove(round);
            self.propagation.remove(round);
        }
    }

    pub fn known_rounds(&self) -> impl Iterator<Item = Round> + '_ {
        self.proposals.keys().copied()
    }

    pub fn contains_round(&self, round: Round) -> bool {
        self.proposals.contains_key(&round)
    }
}
