//! # Proposal Storage
//!
//! Owns every sibling [`BlockStorage`] for one round — the round may see
//! competing proposal/block hashes from different peers before it
//! settles. Decides `Commit` when one hash's storage crosses
//! supermajority, or `Reject` when no hash can still reach it.

use crate::consistency::SupermajorityChecker;
use crate::hash::YacHash;
use crate::outcome::Outcome;
use crate::round::Round;
use crate::storage::block_storage::BlockStorage;
use crate::vote::Vote;

/// All block storages opened so far for one round, plus the sticky
/// outcome once decided.
#[derive(Debug, Clone)]
pub struct ProposalStorage {
    storage_key: Round,
    peers_in_round: usize,
    checker: SupermajorityChecker,
    block_storages: Vec<BlockStorage>,
    current_state: Option<Outcome>,
}

impl ProposalStorage {
    pub fn new(storage_key: Round, peers_in_round: usize, checker: SupermajorityChecker) -> Self {
        Self {
            storage_key,
            peers_in_round,
            checker,
            block_storages: Vec::new(),
            current_state: None,
        }
    }

    /// Applies §4.3's six-step insert logic. Returns the (possibly
    /// still-`None`) sticky outcome.
    ///
    /// Votes that arrive after the outcome is already sticky are still
    /// recorded into their block storage for evidence forwarding — only
    /// the outcome transition itself is gated on `current_state` being
    /// unset.
    pub fn insert(&mut self, vote: Vote) -> Option<Outcome> {
        if self.should_insert(&vote) {
            tracing::debug!(
                round = %vote.hash.round,
                proposal_hash = %vote.hash.proposal_hash,
                block_hash = %vote.hash.block_hash,
                "vote accepted into proposal storage"
            );

            let hash = vote.hash.clone();
            let block_state = self.find_or_create_store(hash).insert(vote);

            if self.current_state.is_none() {
                if let Some(commit) = block_state {
                    self.current_state = Some(commit);
                } else if let Some(reject) = self.find_reject_proof() {
                    tracing::debug!(round = %self.storage_key, "reject proof found");
                    self.current_state = Some(reject);
                }
            }
        }
        self.current_state.clone()
    }

    pub fn insert_batch(&mut self, votes: Vec<Vote>) -> Option<Outcome> {
        for vote in votes {
            self.insert(vote);
        }
        self.current_state.clone()
    }

    pub fn storage_key(&self) -> Round {
        self.storage_key
    }

    pub fn peers_in_round(&self) -> usize {
        self.peers_in_round
    }

    pub fn state(&self) -> Option<Outcome> {
        self.current_state.clone()
    }

    fn should_insert(&self, vote: &Vote) -> bool {
        self.check_proposal_round(vote.hash.round) && self.check_peer_uniqueness(vote)
    }

    fn check_proposal_round(&self, round: Round) -> bool {
        round == self.storage_key
    }

    /// A peer's public key may appear in at most one sibling
    /// `BlockStorage` in this proposal storage. This is the literal
    /// pubkey-uniqueness invariant from the data model, not the weaker
    /// "already byte-contained" check the distillation's source used —
    /// see DESIGN.md.
    fn check_peer_uniqueness(&self, vote: &Vote) -> bool {
        self.block_storages.iter().all(|storage| {
            storage.storage_key() == &vote.hash
                || !storage
                    .votes()
                    .iter()
                    .any(|v| v.signer() == vote.signer())
        })
    }

    fn find_or_create_store(&mut self, hash: YacHash) -> &mut BlockStorage {
        if let Some(pos) = self
            .block_storages
            .iter()
            .position(|s| s.storage_key() == &hash)
        {
            return &mut self.block_storages[pos];
        }
        self.block_storages
            .push(BlockStorage::new(hash, self.peers_in_round, self.checker));
        self.block_storages.last_mut().unwrap()
    }

    fn find_reject_proof(&self) -> Option<Outcome> {
        let vote_groups: Vec<u64> = self
            .block_storages
            .iter()
            .map(|s| s.vote_count() as u64)
            .collect();

        let is_reject = !self
            .checker
            .can_have_supermajority(&vote_groups, self.peers_in_round as u64);

        if is_reject {
            let votes: Vec<Vote> = self
                .block_storages
                .iter()
                .flat_map(|s| s.votes().iter().cloned())
                .collect();
            Some(Outcome::Reject { votes })
        } else {
            None
        }
    }
}
