//! # Transport
//!
//! External collaborator (§6): fire-and-forget vote delivery between
//! peers. The core only depends on [`Transport`]; [`InProcessTransport`]
//! is a reference implementation that wires several [`crate::yac::Yac`]
//! instances together in one process, for tests and the demo binary,
//! the way this codebase's `gossip.rs` wires peers together over real
//! sockets.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::cluster::Peer;
use crate::crypto::PublicKey;
use crate::vote::Vote;
use crate::yac::Yac;

/// External collaborator (§6): sends a vote batch to one peer. Delivery
/// is fire-and-forget from the round driver's perspective — retry or
/// give-up policy is entirely this trait's implementation's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_state(&self, peer: &Peer, votes: Vec<Vote>);
}

/// Reference [`Transport`]: routes vote batches directly into other
/// registered `Yac` instances' `on_state`, in-process.
///
/// Holds `Weak` handles into each registered driver rather than `Arc`,
/// per the note on cyclic structures: the transport is a
/// supervisor-subscriber of the driver, not a co-owner of it.
#[derive(Default)]
pub struct InProcessTransport {
    peers: Mutex<HashMap<PublicKey, Weak<Yac>>>,
}

impl InProcessTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a driver under its own public key so other registered
    /// drivers can route votes to it.
    pub fn register(&self, public_key: PublicKey, yac: &Arc<Yac>) {
        self.peers.lock().insert(public_key, Arc::downgrade(yac));
    }

    pub fn unregister(&self, public_key: &PublicKey) {
        self.peers.lock().remove(public_key);
    }
}

#[async_trait]
impl Transport for InProcessTransport {
    async fn send_state(&self, peer: &Peer, votes: Vec<Vote>) {
        let target = self.peers.lock().get(&peer.public_key).cloned();
        let Some(target) = target.and_then(|weak| weak.upgrade()) else {
            tracing::debug!(peer = %peer.address, "in-process transport: peer not registered, dropping");
            return;
        };
        target.on_state(votes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterOrdering;
    use crate::config::YacConfig;
    use crate::crypto::{CryptoProvider, Ed25519CryptoProvider};
    use crate::hash::YacHash;
    use crate::round::Round;

    #[tokio::test]
    async fn send_state_routes_to_a_registered_peer() {
        let transport = InProcessTransport::new();
        let crypto_a = Arc::new(Ed25519CryptoProvider::generate());
        let crypto_b = Arc::new(Ed25519CryptoProvider::generate());

        let peer_a = Peer::new("a", crypto_a.public_key());
        let peer_b = Peer::new("b", crypto_b.public_key());
        let order = ClusterOrdering::create(vec![peer_a.clone(), peer_b.clone()]).unwrap();

        let yac_b = Yac::new(
            YacConfig::default(),
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&crypto_b) as Arc<dyn CryptoProvider>,
            order,
        );
        transport.register(peer_b.public_key.clone(), &yac_b);

        let hash = YacHash::new(Round::genesis(), "p", "b");
        let vote = crypto_a.get_vote(hash);
        transport.send_state(&peer_b, vec![vote]).await;

        // Routed synchronously inside send_state; on_state has already run.
        assert!(yac_b.known_rounds().iter().any(|r| *r == Round::genesis()));
    }

    #[tokio::test]
    async fn send_state_to_an_unregistered_peer_is_a_silent_no_op() {
        let transport = InProcessTransport::new();
        let crypto_a = Ed25519CryptoProvider::generate();
        let stranger = Peer::new("ghost", PublicKey([7; 32]));
        let hash = YacHash::new(Round::genesis(), "p", "b");
        transport
            .send_state(&stranger, vec![crypto_a.get_vote(hash)])
            .await;
        // No panic, nothing to assert beyond "did not block forever".
    }
}
