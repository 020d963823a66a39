//! # Cleanup Strategy
//!
//! Bounds memory by discarding rounds the cluster has already moved
//! past. A small state machine: last commit round, last reject round,
//! and a min-heap of every round ever created.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::outcome::Outcome;
use crate::round::Round;

/// Observes every finalized round and directs eviction of obsolete ones.
#[derive(Debug, Default)]
pub struct BufferedCleanupStrategy {
    last_commit_round: Option<Round>,
    last_reject_round: Option<Round>,
    heap: BinaryHeap<Reverse<Round>>,
}

impl BufferedCleanupStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finalized round's outcome and returns the rounds that
    /// may now be discarded, if any.
    ///
    /// On commit: if the last reject round is older than the last commit
    /// round, the reject bookkeeping is cleared (a later commit
    /// supersedes an earlier reject entirely). Either way, every round
    /// strictly less than the new `last_commit_round` is drained from
    /// the heap and returned.
    pub fn finalize(&mut self, round: Round, outcome: &Outcome) -> Option<Vec<Round>> {
        match outcome {
            Outcome::Commit { .. } => {
                if self.last_commit_round < self.last_reject_round {
                    self.last_reject_round = None;
                }
                self.last_commit_round = Some(
                    self.last_commit_round
                        .map_or(round, |current| current.max(round)),
                );
            }
            Outcome::Reject { .. } => {
                self.last_reject_round = Some(
                    self.last_reject_round
                        .map_or(round, |current| current.max(round)),
                );
            }
        }

        let Some(commit) = self.last_commit_round else {
            return None;
        };

        let mut drained = Vec::new();
        while let Some(Reverse(top)) = self.heap.peek().copied() {
            if top < commit {
                self.heap.pop();
                drained.push(top);
            } else {
                break;
            }
        }

        if drained.is_empty() {
            None
        } else {
            Some(drained)
        }
    }

    /// Permits creating a `ProposalStorage` for `round` iff it is not
    /// older than the earliest of the last commit/reject rounds (absent
    /// bookkeeping counts as `-infinity`, i.e. always permits). Pushes
    /// the round onto the heap on success.
    ///
    /// This prevents re-animating already-cleaned history, but — as in
    /// the source this was distilled from — it does nothing to stop a
    /// peer from flooding the heap with many distinct low rounds before
    /// any of them ever finalizes. Left unfixed deliberately; see
    /// DESIGN.md.
    pub fn should_create_round(&mut self, round: Round) -> bool {
        let floor = match (self.last_commit_round, self.last_reject_round) {
            (Some(c), Some(r)) => c.min(r),
            (Some(c), None) => c,
            (None, Some(r)) => r,
            (None, None) => {
                self.heap.push(Reverse(round));
                return true;
            }
        };

        if round >= floor {
            self.heap.push(Reverse(round));
            true
        } else {
            false
        }
    }

    pub fn last_commit_round(&self) -> Option<Round> {
        self.last_commit_round
    }

    pub fn last_reject_round(&self) -> Option<Round> {
        self.last_reject_round
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit() -> Outcome {
        Outcome::Commit { votes: vec![] }
    }

    fn reject() -> Outcome {
        Outcome::Reject { votes: vec![] }
    }

    #[test]
    fn scenario_six_from_spec() {
        // reject((1,1)), reject((1,2)), commit((1,3)).
        let mut strategy = BufferedCleanupStrategy::new();
        strategy.should_create_round(Round::new(1, 1));
        strategy.should_create_round(Round::new(1, 2));
        strategy.should_create_round(Round::new(1, 3));

        assert_eq!(strategy.finalize(Round::new(1, 1), &reject()), None);
        assert_eq!(strategy.finalize(Round::new(1, 2), &reject()), None);

        let drained = strategy
            .finalize(Round::new(1, 3), &commit())
            .unwrap();
        assert_eq!(drained, vec![Round::new(1, 1), Round::new(1, 2)]);
        assert_eq!(strategy.last_commit_round(), Some(Round::new(1, 3)));
        assert_eq!(strategy.last_reject_round(), None);
    }

    #[test]
    fn should_create_round_blocks_reanimation_of_cleaned_history() {
        let mut strategy = BufferedCleanupStrategy::new();
        strategy.finalize(Round::new(2, 1), &commit());
        assert!(!strategy.should_create_round(Round::new(1, 1)));
        assert!(strategy.should_create_round(Round::new(2, 1)));
        assert!(strategy.should_create_round(Round::new(3, 1)));
    }

    #[test]
    fn absent_bookkeeping_permits_any_round() {
        let mut strategy = BufferedCleanupStrategy::new();
        assert!(strategy.should_create_round(Round::new(1, 1)));
    }

    #[test]
    fn reject_behind_commit_is_cleared_on_next_commit() {
        // last_commit_round starts behind last_reject_round, so the next
        // commit clears the stale reject bookkeeping.
        let mut strategy = BufferedCleanupStrategy::new();
        strategy.finalize(Round::new(1, 1), &commit());
        strategy.finalize(Round::new(5, 1), &reject());
        assert_eq!(strategy.last_reject_round(), Some(Round::new(5, 1)));

        strategy.finalize(Round::new(6, 1), &commit());
        assert_eq!(strategy.last_reject_round(), None);
    }

    #[test]
    fn reject_ahead_of_commit_survives_once_commit_catches_up() {
        // last_commit_round is already at or past last_reject_round, so
        // a further commit leaves the reject bookkeeping untouched.
        let mut strategy = BufferedCleanupStrategy::new();
        strategy.finalize(Round::new(5, 1), &commit());
        strategy.finalize(Round::new(3, 1), &reject());
        assert_eq!(strategy.last_reject_round(), Some(Round::new(3, 1)));

        strategy.finalize(Round::new(6, 1), &commit());
        assert_eq!(strategy.last_reject_round(), Some(Round::new(3, 1)));
    }
}
