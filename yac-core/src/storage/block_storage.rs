//! # Block Storage
//!
//! Holds the vote vector for one specific `(round, proposal_hash,
//! block_hash)` key. The only outcome a `BlockStorage` can ever produce
//! is `Commit` — rejection is a property of the whole round (sibling
//! storages disagreeing), decided one level up by `ProposalStorage`.

use crate::consistency::SupermajorityChecker;
use crate::hash::YacHash;
use crate::outcome::Outcome;
use crate::vote::Vote;

/// Votes accumulated for one exact `YacHash`, plus the peer count needed
/// to evaluate supermajority.
#[derive(Debug, Clone)]
pub struct BlockStorage {
    storage_key: YacHash,
    peers_in_round: usize,
    checker: SupermajorityChecker,
    votes: Vec<Vote>,
}

impl BlockStorage {
    pub fn new(storage_key: YacHash, peers_in_round: usize, checker: SupermajorityChecker) -> Self {
        Self {
            storage_key,
            peers_in_round,
            checker,
            votes: Vec::new(),
        }
    }

    /// Accepts `vote` iff its hash matches this storage's key and it is
    /// not already present (byte-identical). Returns the resulting
    /// state either way — a rejected insert just re-reads the current
    /// state, matching the original's "insert always calls getState"
    /// idempotent-read behavior.
    pub fn insert(&mut self, vote: Vote) -> Option<Outcome> {
        if self.valid_scheme(&vote) && self.unique_vote(&vote) {
            tracing::debug!(
                round = %vote.hash.round,
                proposal_hash = %vote.hash.proposal_hash,
                block_hash = %vote.hash.block_hash,
                votes = self.votes.len() + 1,
                peers_in_round = self.peers_in_round,
                "vote inserted into block storage"
            );
            self.votes.push(vote);
        }
        self.state()
    }

    /// Inserts each vote in order; returns only the final state.
    pub fn insert_batch(&mut self, votes: Vec<Vote>) -> Option<Outcome> {
        for vote in votes {
            self.insert(vote);
        }
        self.state()
    }

    /// Idempotent read: `Commit` iff the vote count has crossed the
    /// supermajority threshold for this round's peer count.
    pub fn state(&self) -> Option<Outcome> {
        if self.checker.has_supermajority(self.votes.len() as u64, self.peers_in_round as u64) {
            Some(Outcome::Commit {
                votes: self.votes.clone(),
            })
        } else {
            None
        }
    }

    pub fn storage_key(&self) -> &YacHash {
        &self.storage_key
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    fn valid_scheme(&self, vote: &Vote) -> bool {
        self.storage_key == vote.hash
    }

    fn unique_vote(&self, vote: &Vote) -> bool {
        !self.votes.contains(vote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::ConsistencyModel;
    use crate::crypto::{CryptoProvider, Ed25519CryptoProvider};
    use crate::round::Round;

    fn checker(model: ConsistencyModel) -> SupermajorityChecker {
        SupermajorityChecker::new(model)
    }

    fn storage(peers: usize) -> (BlockStorage, YacHash) {
        let hash = YacHash::new(Round::genesis(), "p", "b");
        (
            BlockStorage::new(hash.clone(), peers, checker(ConsistencyModel::Cft)),
            hash,
        )
    }

    #[test]
    fn wrong_hash_vote_is_silently_ignored() {
        let (mut bs, _) = storage(4);
        let provider = Ed25519CryptoProvider::generate();
        let other = YacHash::new(Round::genesis(), "different", "hash");
        let vote = provider.get_vote(other);
        assert!(bs.insert(vote).is_none());
        assert_eq!(bs.vote_count(), 0);
    }

    #[test]
    fn duplicate_vote_is_ignored() {
        let (mut bs, hash) = storage(4);
        let provider = Ed25519CryptoProvider::generate();
        let vote = provider.get_vote(hash);
        bs.insert(vote.clone());
        bs.insert(vote);
        assert_eq!(bs.vote_count(), 1);
    }

    #[test]
    fn commits_once_supermajority_reached() {
        let (mut bs, hash) = storage(4); // CFT, supermajority = 3
        for _ in 0..2 {
            let provider = Ed25519CryptoProvider::generate();
            assert!(bs.insert(provider.get_vote(hash.clone())).is_none());
        }
        let provider = Ed25519CryptoProvider::generate();
        let outcome = bs.insert(provider.get_vote(hash)).unwrap();
        assert!(outcome.is_commit());
        assert_eq!(outcome.votes().len(), 3);
    }

    #[test]
    fn state_is_idempotent() {
        let (mut bs, hash) = storage(1); // solo peer, supermajority = 1
        let provider = Ed25519CryptoProvider::generate();
        bs.insert(provider.get_vote(hash));
        assert!(bs.state().unwrap().is_commit());
        assert!(bs.state().unwrap().is_commit());
    }
}
