//! # Vote
//!
//! A signed [`YacHash`]. Small and copyable by design (see §9's note on
//! favoring value types over the original's reference-counted handles).

use serde::{Deserialize, Serialize};

use crate::crypto::{PublicKey, Signature};
use crate::hash::YacHash;

/// A `YacHash` plus the signature of the peer who cast it.
///
/// Two votes are equal iff their hashes are equal *and* their signatures
/// match byte-for-byte — two honest votes for the same hash from
/// different peers are **not** equal, which is exactly what lets
/// `BlockStorage` count them as distinct evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub hash: YacHash,
    pub signature: Signature,
}

impl Vote {
    pub fn new(hash: YacHash, signature: Signature) -> Self {
        Self { hash, signature }
    }

    pub fn signer(&self) -> &PublicKey {
        &self.signature.public_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Ed25519CryptoProvider;
    use crate::round::Round;

    #[test]
    fn votes_from_different_signers_are_not_equal() {
        let provider_a = Ed25519CryptoProvider::generate();
        let provider_b = Ed25519CryptoProvider::generate();
        let hash = YacHash::new(Round::genesis(), "p", "b");

        let vote_a = provider_a.get_vote(hash.clone());
        let vote_b = provider_b.get_vote(hash);

        assert_ne!(vote_a, vote_b);
        assert_eq!(vote_a.hash, vote_b.hash);
    }

    #[test]
    fn identical_signature_and_hash_is_equal() {
        let provider = Ed25519CryptoProvider::generate();
        let hash = YacHash::new(Round::genesis(), "p", "b");
        let v1 = provider.get_vote(hash.clone());
        let v2 = provider.get_vote(hash);
        assert_eq!(v1, v2);
    }
}
