//! # Round
//!
//! The primary key identifying a YAC voting session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(block_round, reject_round)` pair with lexicographic ordering.
///
/// `block_round` advances on commit; `reject_round` advances on reject
/// within a `block_round`. Two peers with the same `Round` are, by
/// construction, voting on the same decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Round {
    pub block_round: u64,
    pub reject_round: u64,
}

impl Round {
    pub const fn new(block_round: u64, reject_round: u64) -> Self {
        Self {
            block_round,
            reject_round,
        }
    }

    /// The round that opens a new `block_round`, with no rejects yet.
    pub const fn genesis() -> Self {
        Self::new(1, 1)
    }

    /// The round immediately following a commit of this one.
    pub const fn next_block(self) -> Self {
        Self::new(self.block_round + 1, 1)
    }

    /// The round immediately following a reject of this one.
    pub const fn next_reject(self) -> Self {
        Self::new(self.block_round, self.reject_round + 1)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.block_round, self.reject_round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Round::new(1, 1) < Round::new(1, 2));
        assert!(Round::new(1, 9) < Round::new(2, 1));
        assert_eq!(Round::new(3, 3), Round::new(3, 3));
    }

    #[test]
    fn next_block_resets_reject_round() {
        assert_eq!(Round::new(5, 9).next_block(), Round::new(6, 1));
    }

    #[test]
    fn next_reject_keeps_block_round() {
        assert_eq!(Round::new(5, 9).next_reject(), Round::new(5, 10));
    }
}
