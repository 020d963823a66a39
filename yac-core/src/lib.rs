// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # YAC — Yet Another Consensus
//!
//! YAC is the hash gate a block-production pipeline calls once it has a
//! candidate for a round: it decides whether a cluster of peers agrees on a
//! `(proposal_hash, block_hash)` pair, or must reject the round and try
//! again. It is not a block-chain. It does not produce proposals, gossip
//! peer membership, or persist anything across restarts.
//!
//! ## Architecture
//!
//! Leaves-first:
//!
//! - **consistency** — the `Kf+1` supermajority arithmetic, parameterized
//!   over BFT (`K=3`) and CFT (`K=2`).
//! - **storage** — `BlockStorage` → `ProposalStorage` → `VoteStorage`, the
//!   nested state machine that turns a stream of votes into a sticky
//!   `Commit`/`Reject` outcome per round.
//! - **cleanup** — bounds memory by discarding rounds the cluster has
//!   already moved past.
//! - **cluster** — deterministic peer ordering and leader rotation.
//! - **timer** — the cancellable delay the round driver rotates on.
//! - **yac** — the round driver itself: one mutex, one vote loop, one
//!   outcome channel.
//! - **gate** — translates block-creator events into votes and outcomes
//!   into pipeline-level events.
//!
//! Everything the core *consumes* — transport, signing, peer ordering,
//! hashing — is expressed as a trait in [`crypto`], [`cluster`], [`hash`]
//! and [`transport`], with one deterministic reference implementation each
//! so the crate is runnable standalone for tests and the `yac-node` demo.
//!
//! ## Design Philosophy
//!
//! 1. The core never panics on untrusted input — malformed or adversarial
//!    votes are dropped and logged, never unwrapped.
//! 2. One mutex guards `cluster_order`, `round`, and `VoteStorage` in the
//!    round driver. Nothing awaits while holding it.
//! 3. Errors that a caller can act on are a typed enum; errors that are
//!    just "this round can't make progress yet" are a `tracing` event and
//!    a `None`, not a `Result`.

pub mod cleanup;
pub mod cluster;
pub mod config;
pub mod consistency;
pub mod crypto;
pub mod error;
pub mod gate;
pub mod hash;
pub mod outcome;
pub mod round;
pub mod storage;
pub mod timer;
pub mod transport;
pub mod vote;
pub mod yac;

pub use cluster::{ClusterOrdering, Peer, PeerOrderer};
pub use config::YacConfig;
pub use consistency::{ConsistencyModel, SupermajorityChecker};
pub use error::YacError;
pub use gate::{BlockCreatorEvent, GateAdaptor, GateEvent};
pub use hash::{HashProvider, YacHash};
pub use outcome::Outcome;
pub use round::Round;
pub use vote::Vote;
pub use yac::Yac;
