//! # Configuration & Constants
//!
//! The round timeout, the chosen consistency model, and the handful of
//! tuning knobs the round driver needs, collected in one place the way
//! the rest of this codebase keeps its magic numbers in a `config`
//! module rather than scattered through call sites.

use std::time::Duration;

use crate::consistency::ConsistencyModel;

/// How long the round driver waits before rotating to the next peer in
/// the cluster ordering if no outcome has arrived yet.
pub const DEFAULT_VOTE_DELAY: Duration = Duration::from_millis(5_000);

/// Divisor used by the BFT adversarial re-cast term in
/// `can_have_supermajority` (`⌊(N-1)/5⌋`). Fixed by the specification,
/// not configurable.
pub const BFT_ADVERSARIAL_DIVISOR: u64 = 5;

/// Runtime configuration for a single [`crate::yac::Yac`] instance.
#[derive(Debug, Clone)]
pub struct YacConfig {
    /// Consistency model this instance enforces for the lifetime of the
    /// round driver. Chosen once at construction; never changes.
    pub consistency_model: ConsistencyModel,

    /// Delay between successive `voting_step` rotations to the next
    /// leader in the cluster ordering.
    pub vote_delay: Duration,
}

impl Default for YacConfig {
    fn default() -> Self {
        Self {
            consistency_model: ConsistencyModel::Cft,
            vote_delay: DEFAULT_VOTE_DELAY,
        }
    }
}

impl YacConfig {
    pub fn new(consistency_model: ConsistencyModel, vote_delay: Duration) -> Self {
        Self {
            consistency_model,
            vote_delay,
        }
    }
}
