//! # Outcome
//!
//! The result a [`crate::storage::proposal_storage::ProposalStorage`]
//! produces once a round can no longer stay undecided.

use crate::vote::Vote;

/// A round's final decision: either some hash reached supermajority, or
/// no hash can reach it anymore.
///
/// Both variants carry the evidence votes that justify the decision —
/// `Commit` carries the winning `BlockStorage`'s votes, `Reject` carries
/// the union of every sibling `BlockStorage`'s votes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Commit { votes: Vec<Vote> },
    Reject { votes: Vec<Vote> },
}

impl Outcome {
    pub fn votes(&self) -> &[Vote] {
        match self {
            Outcome::Commit { votes } | Outcome::Reject { votes } => votes,
        }
    }

    pub fn is_commit(&self) -> bool {
        matches!(self, Outcome::Commit { .. })
    }

    pub fn is_reject(&self) -> bool {
        matches!(self, Outcome::Reject { .. })
    }

    /// The round of this outcome, read off the first evidence vote.
    ///
    /// Every vote bundled into one `Outcome` shares a round by
    /// construction (they all came from the same `ProposalStorage`), so
    /// any vote's round is representative.
    pub fn round(&self) -> Option<crate::round::Round> {
        self.votes().first().map(|v| v.hash.round)
    }
}
