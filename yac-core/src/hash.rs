//! # Voting Hash & Hash Provider
//!
//! `YacHash` is the composite value peers actually vote on. The
//! [`HashProvider`] trait is a consumed external interface — the core
//! only needs *a* deterministic way to turn a proposal/block pair into
//! hex strings; it does not care which digest algorithm produces them.
//! [`Blake3HashProvider`] is the reference implementation used by tests
//! and the demo binary.

use serde::{Deserialize, Serialize};

use crate::round::Round;

/// The composite value a peer votes on: a round plus a proposal/block
/// hash pair.
///
/// Equality and hashing deliberately ignore `block_signature` — two
/// votes for the same `(round, proposal_hash, block_hash)` are the same
/// vote for storage purposes even if the attached signature differs,
/// which cannot actually happen for a single honest signer but matters
/// for how `BlockStorage` keys its vote vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YacHash {
    pub round: Round,
    pub proposal_hash: String,
    pub block_hash: String,
    pub block_signature: Option<Vec<u8>>,
}

impl YacHash {
    pub fn new(round: Round, proposal_hash: impl Into<String>, block_hash: impl Into<String>) -> Self {
        Self {
            round,
            proposal_hash: proposal_hash.into(),
            block_hash: block_hash.into(),
            block_signature: None,
        }
    }

    /// The "round had no data" hash: empty proposal and block hashes.
    /// `AgreementOnNone` in the gate adaptor is keyed on this shape.
    pub fn empty(round: Round) -> Self {
        Self::new(round, "", "")
    }

    pub fn is_empty(&self) -> bool {
        self.proposal_hash.is_empty() && self.block_hash.is_empty()
    }

    /// The bytes a signature is computed over: round, then proposal hash,
    /// then block hash, each length-prefixed so no ambiguous concatenation
    /// exists between adjacent fields.
    pub fn signable_payload(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.round.block_round.to_le_bytes());
        buf.extend_from_slice(&self.round.reject_round.to_le_bytes());
        for field in [&self.proposal_hash, &self.block_hash] {
            buf.extend_from_slice(&(field.len() as u32).to_le_bytes());
            buf.extend_from_slice(field.as_bytes());
        }
        buf
    }
}

impl PartialEq for YacHash {
    fn eq(&self, other: &Self) -> bool {
        self.round == other.round
            && self.proposal_hash == other.proposal_hash
            && self.block_hash == other.block_hash
    }
}
impl Eq for YacHash {}

impl std::hash::Hash for YacHash {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.round.hash(state);
        self.proposal_hash.hash(state);
        self.block_hash.hash(state);
    }
}

/// What the block-creator hands the gate adaptor: either a fresh
/// proposal/block candidate, or a marker that this round had nothing to
/// propose.
#[derive(Debug, Clone)]
pub struct RoundCandidate {
    pub proposal: String,
    pub block: String,
}

/// External collaborator (§6): digests a proposal/block pair into the
/// round's voting hashes, and converts a `YacHash` into the pipeline's
/// own hash representation.
pub trait HashProvider: Send + Sync {
    /// Builds the `YacHash` for a round given an optional candidate. When
    /// `candidate` is `None` (the block-creator had no data this round),
    /// both hash strings are empty.
    fn make_hash(&self, round: Round, candidate: Option<&RoundCandidate>) -> YacHash;

    /// The inverse direction: the bytes a surrounding pipeline would use
    /// to refer to this hash.
    fn to_model_hash(&self, hash: &YacHash) -> Vec<u8>;
}

/// BLAKE3-based reference [`HashProvider`].
///
/// Hashes the raw proposal/block bytes independently and hex-encodes
/// each digest, matching the `YacHash { proposal_hash, block_hash }`
/// shape (two independent hex strings, not one combined digest).
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3HashProvider;

impl HashProvider for Blake3HashProvider {
    fn make_hash(&self, round: Round, candidate: Option<&RoundCandidate>) -> YacHash {
        match candidate {
            Some(c) => YacHash::new(
                round,
                hex::encode(blake3::hash(c.proposal.as_bytes()).as_bytes()),
                hex::encode(blake3::hash(c.block.as_bytes()).as_bytes()),
            ),
            None => YacHash::empty(round),
        }
    }

    fn to_model_hash(&self, hash: &YacHash) -> Vec<u8> {
        blake3::hash(&hash.signable_payload()).as_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_signature() {
        let mut a = YacHash::new(Round::genesis(), "p", "b");
        let mut b = a.clone();
        a.block_signature = Some(vec![1, 2, 3]);
        b.block_signature = Some(vec![9, 9, 9]);
        assert_eq!(a, b);
    }

    #[test]
    fn inequality_on_proposal_hash() {
        let a = YacHash::new(Round::genesis(), "p1", "b");
        let b = YacHash::new(Round::genesis(), "p2", "b");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_hash_is_empty() {
        assert!(YacHash::empty(Round::genesis()).is_empty());
        assert!(!YacHash::new(Round::genesis(), "p", "b").is_empty());
    }

    #[test]
    fn blake3_provider_is_deterministic() {
        let provider = Blake3HashProvider;
        let candidate = RoundCandidate {
            proposal: "proposal-1".into(),
            block: "block-1".into(),
        };
        let h1 = provider.make_hash(Round::genesis(), Some(&candidate));
        let h2 = provider.make_hash(Round::genesis(), Some(&candidate));
        assert_eq!(h1, h2);
        assert_eq!(h1.proposal_hash.len(), 64);
    }

    #[test]
    fn blake3_provider_no_data_is_empty_hash() {
        let provider = Blake3HashProvider;
        let h = provider.make_hash(Round::genesis(), None);
        assert!(h.is_empty());
    }
}
