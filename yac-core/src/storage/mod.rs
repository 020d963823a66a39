//! # Storage
//!
//! The nested state machine that turns a stream of votes into a sticky
//! per-round `Commit`/`Reject` decision.
//!
//! ## Architecture
//!
//! ```text
//! block_storage.rs     — votes for one specific (round, proposal_hash, block_hash)
//! proposal_storage.rs  — owns the sibling block storages for one round
//! vote_storage.rs      — indexes proposal storages by round, tracks propagation state
//! propagation_state.rs — the NotSentNotProcessed -> SentNotProcessed -> SentProcessed law
//! ```
//!
//! Every level is append-only and sticky: once a `ProposalStorage`
//! decides, nothing it holds is ever mutated to a different outcome
//! again.

pub mod block_storage;
pub mod propagation_state;
pub mod proposal_storage;
pub mod vote_storage;

pub use block_storage::BlockStorage;
pub use propagation_state::PropagationState;
pub use proposal_storage::ProposalStorage;
pub use vote_storage::VoteStorage;
