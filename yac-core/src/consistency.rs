//! # Consistency Model & Supermajority Checker
//!
//! Pure arithmetic, no I/O, no locking. Everything else in the core calls
//! down into this module to decide whether a vote count has, or may yet
//! reach, supermajority.

use serde::{Deserialize, Serialize};

use crate::config::BFT_ADVERSARIAL_DIVISOR;

/// Which fault model a [`crate::yac::Yac`] instance enforces.
///
/// Selected once at construction and never changed: mixing consistency
/// models within a running cluster would mean peers disagree on what
/// "enough votes" means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyModel {
    /// Byzantine fault tolerance: `K = 3`, tolerates `f = ⌊(N-1)/3⌋`
    /// arbitrarily malicious peers.
    Bft,
    /// Crash fault tolerance: `K = 2`, tolerates `f = ⌊(N-1)/2⌋` peers
    /// that simply stop responding.
    Cft,
}

impl ConsistencyModel {
    /// The `K` in the generic `Kf+1` supermajority predicate.
    pub const fn k(self) -> u64 {
        match self {
            ConsistencyModel::Bft => 3,
            ConsistencyModel::Cft => 2,
        }
    }
}

/// Evaluates the `Kf+1` supermajority predicate for a chosen
/// [`ConsistencyModel`].
///
/// Stateless and cheap to construct — a `SupermajorityChecker` carries
/// only the model and can be copied freely.
#[derive(Debug, Clone, Copy)]
pub struct SupermajorityChecker {
    model: ConsistencyModel,
}

impl SupermajorityChecker {
    pub const fn new(model: ConsistencyModel) -> Self {
        Self { model }
    }

    pub const fn model(self) -> ConsistencyModel {
        self.model
    }

    /// `true` iff `agreed` votes out of `n` peers already constitute a
    /// supermajority under this checker's model.
    ///
    /// `agreed * K >= (K - 1) * (n - 1) + K`, restricted to `agreed <= n`.
    pub fn has_supermajority(self, agreed: u64, n: u64) -> bool {
        if agreed > n {
            return false;
        }
        let k = self.model.k();
        agreed * k >= (k - 1) * n.saturating_sub(1) + k
    }

    /// `true` iff some hash among `vote_groups` may still reach
    /// supermajority once the remaining `n - sum(vote_groups)` peers have
    /// voted.
    ///
    /// Under CFT this is just "can the leading group plus every undecided
    /// vote reach supermajority". Under BFT we additionally grant the
    /// adversary up to `min(⌊(n-1)/5⌋, voted - largest)` already-cast
    /// votes it may re-cast for the leading hash — modeling malicious
    /// peers that voted for a losing hash flipping their vote.
    pub fn can_have_supermajority(self, vote_groups: &[u64], n: u64) -> bool {
        let largest = vote_groups.iter().copied().max().unwrap_or(0);
        let voted: u64 = vote_groups.iter().sum();
        let undecided = n.saturating_sub(voted);

        let candidate = match self.model {
            ConsistencyModel::Cft => largest + undecided,
            ConsistencyModel::Bft => {
                let adversarial = (n.saturating_sub(1) / BFT_ADVERSARIAL_DIVISOR)
                    .min(voted.saturating_sub(largest));
                largest + undecided + adversarial
            }
        };

        self.has_supermajority(candidate.min(n), n)
    }
}
