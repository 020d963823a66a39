//! # Error Types
//!
//! Most of what can go wrong in YAC is not an error at all — a malformed
//! vote, an unknown peer, a failed signature check are all expected inputs
//! from an untrusted network and are handled by logging and dropping (see
//! the module docs on `storage` and `yac`). `YacError` covers only the
//! failures a caller needs to react to programmatically: bad construction
//! arguments and contract violations between collaborators.

use thiserror::Error;

/// Errors a caller of the core must be able to match on.
///
/// Deliberately small. If you're tempted to add a variant for something
/// the specification calls "silently dropped" or "logged only", don't —
/// emit a `tracing` event at the call site instead.
#[derive(Debug, Error)]
pub enum YacError {
    /// Cluster ordering cannot be built from an empty peer list.
    #[error("cannot build a cluster ordering from an empty peer list")]
    EmptyPeerList,

    /// A caller passed a `peers_in_round` value for a round whose
    /// `ProposalStorage` was already created with a different one. The
    /// original code treats this as an implicit precondition; we make it
    /// an explicit, matchable error instead of an assertion panic.
    #[error("round {round:?} was already opened with peers_in_round={expected}, got {actual}")]
    PeerCountMismatch {
        round: crate::round::Round,
        expected: usize,
        actual: usize,
    },

    /// A vote batch handed to the vote storage was empty; there is no
    /// round to index it under.
    #[error("cannot store an empty vote batch")]
    EmptyVoteBatch,
}
