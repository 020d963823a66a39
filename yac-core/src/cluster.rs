//! # Cluster Ordering & Peer Orderer
//!
//! A round's cluster ordering is a deterministic shuffle of the ledger
//! peer set, used to pick successive vote recipients under leader
//! rotation. [`PeerOrderer`] is a consumed external interface (§6);
//! [`DeterministicPeerOrderer`] is the reference implementation, seeding
//! a PRNG from the round's block hash the way the original seeds
//! `std::default_random_engine` from a `std::seed_seq` built off the
//! block hash bytes.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::crypto::PublicKey;
use crate::error::YacError;
use crate::hash::YacHash;

/// A peer descriptor: network address plus public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub address: String,
    pub public_key: PublicKey,
}

impl Peer {
    pub fn new(address: impl Into<String>, public_key: PublicKey) -> Self {
        Self {
            address: address.into(),
            public_key,
        }
    }
}

/// An ordered peer sequence plus a read/advance index.
///
/// The two read/advance operations deliberately do not compose into a
/// single bounds-checked cursor — see the note on `current_leader` vs.
/// `has_next` below, preserved faithfully from the source this was
/// distilled from (documented as an open question; DESIGN.md records the
/// decision to keep the seam rather than unify it away).
#[derive(Debug, Clone)]
pub struct ClusterOrdering {
    order: Vec<Peer>,
    index: usize,
}

impl ClusterOrdering {
    /// Fails if `order` is empty: there is no leader to elect from
    /// nothing.
    pub fn create(order: Vec<Peer>) -> Result<Self, YacError> {
        if order.is_empty() {
            return Err(YacError::EmptyPeerList);
        }
        Ok(Self { order, index: 0 })
    }

    /// The peer at the current index. If the index has walked off the
    /// end of the ordering, this wraps back to the first peer — a
    /// read-time wrap, not a mutation of `index` itself (unlike the
    /// original, which mutates `index_` as a side effect of reading; see
    /// DESIGN.md).
    pub fn current_leader(&self) -> &Peer {
        let i = if self.index >= self.order.len() {
            0
        } else {
            self.index
        };
        &self.order[i]
    }

    /// `true` iff the index has not yet walked past the last peer.
    /// Strict inequality, not `<`: this is what the round driver relies
    /// on to stop rotating *before* `current_leader` would ever need to
    /// wrap.
    pub fn has_next(&self) -> bool {
        self.index != self.order.len()
    }

    /// Unconditionally advances the index by one. No bound check — the
    /// caller is expected to consult `has_next` first if it cares about
    /// staying within the ordering.
    pub fn switch_to_next(&mut self) -> &mut Self {
        self.index += 1;
        self
    }

    pub fn peers(&self) -> &[Peer] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// External collaborator (§6): deterministically shuffles a round's peer
/// set using the round's block hash as seed.
///
/// Determinism is required: every honest peer must derive the same
/// ordering from the same hash, or leader rotation would diverge across
/// the cluster.
pub trait PeerOrderer: Send + Sync {
    fn get_ordering(&self, hash: &YacHash, peers: Vec<Peer>) -> Option<ClusterOrdering>;
}

/// Reference [`PeerOrderer`]: seeds `rand::rngs::StdRng` from the block
/// hash string's bytes and Fisher-Yates shuffles the peer list.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeterministicPeerOrderer;

impl PeerOrderer for DeterministicPeerOrderer {
    fn get_ordering(&self, hash: &YacHash, mut peers: Vec<Peer>) -> Option<ClusterOrdering> {
        let digest = blake3::hash(hash.block_hash.as_bytes());
        let mut seed = [0u8; 32];
        seed.copy_from_slice(digest.as_bytes());
        let mut rng = StdRng::from_seed(seed);
        peers.shuffle(&mut rng);
        ClusterOrdering::create(peers).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::Round;

    fn peer(n: u8) -> Peer {
        Peer::new(format!("peer-{n}"), PublicKey([n; 32]))
    }

    #[test]
    fn current_leader_wraps_on_read_past_the_end() {
        let mut order = ClusterOrdering::create(vec![peer(1), peer(2)]).unwrap();
        assert_eq!(order.current_leader(), &peer(1));
        order.switch_to_next();
        assert_eq!(order.current_leader(), &peer(2));
        order.switch_to_next();
        // index == len now: has_next is false, but current_leader wraps.
        assert!(!order.has_next());
        assert_eq!(order.current_leader(), &peer(1));
    }

    #[test]
    fn has_next_is_strict_inequality() {
        let mut order = ClusterOrdering::create(vec![peer(1)]).unwrap();
        assert!(order.has_next());
        order.switch_to_next();
        assert!(!order.has_next());
    }

    #[test]
    fn switch_to_next_is_unbounded() {
        let mut order = ClusterOrdering::create(vec![peer(1)]).unwrap();
        order.switch_to_next();
        order.switch_to_next();
        order.switch_to_next();
        // Does not panic; current_leader still wraps safely.
        assert_eq!(order.current_leader(), &peer(1));
    }

    #[test]
    fn empty_peer_list_is_rejected() {
        assert!(ClusterOrdering::create(vec![]).is_err());
    }

    #[test]
    fn deterministic_orderer_is_stable_for_same_hash() {
        let orderer = DeterministicPeerOrderer;
        let hash = YacHash::new(Round::genesis(), "p", "b");
        let peers = vec![peer(1), peer(2), peer(3), peer(4)];

        let a = orderer.get_ordering(&hash, peers.clone()).unwrap();
        let b = orderer.get_ordering(&hash, peers).unwrap();
        assert_eq!(a.peers(), b.peers());
    }

    #[test]
    fn deterministic_orderer_differs_across_hashes_with_overwhelming_probability() {
        let orderer = DeterministicPeerOrderer;
        let peers = vec![peer(1), peer(2), peer(3), peer(4), peer(5)];

        let a = orderer
            .get_ordering(&YacHash::new(Round::genesis(), "p", "b1"), peers.clone())
            .unwrap();
        let b = orderer
            .get_ordering(&YacHash::new(Round::genesis(), "p", "b2"), peers)
            .unwrap();
        assert_ne!(a.peers(), b.peers());
    }
}
