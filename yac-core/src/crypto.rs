//! # Crypto Provider
//!
//! External collaborator (§6): verifies vote signatures as a batch and
//! produces the locally-signed vote. The core only depends on the
//! [`CryptoProvider`] trait; [`Ed25519CryptoProvider`] is the reference
//! implementation used by tests and the demo binary, wrapping
//! `ed25519-dalek` the same way the rest of this codebase wraps its
//! signing primitives — a thin, auditable seam rather than scattered
//! direct calls.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::hash::YacHash;
use crate::vote::Vote;

/// An Ed25519 public key, hex-encodable for logging and wire formats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "hex_bytes_32")] pub [u8; 32]);

impl PublicKey {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// An Ed25519 signature over a [`YacHash`]'s signable payload, plus the
/// signer's public key so the signature is self-describing.
///
/// Deterministic for a given `(key, hash)` pair — no nonce management,
/// no k-value footguns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub public_key: PublicKey,
    #[serde(with = "hex_bytes_64")]
    pub bytes: [u8; 64],
}

/// External collaborator (§6): verifies a batch of votes' signatures and
/// produces the local peer's signed vote for a given hash.
///
/// Implementations must refuse to construct a vote without a valid
/// signing key — there is no "unsigned vote" variant in this core.
pub trait CryptoProvider: Send + Sync {
    /// Verifies every signature in `votes` against its own `hash`. A
    /// single malformed signature fails the whole batch — per §4.6, a
    /// batch with any bad signature is dropped in its entirety.
    fn verify(&self, votes: &[Vote]) -> bool;

    /// Produces the locally signed vote for `hash`.
    fn get_vote(&self, hash: YacHash) -> Vote;

    /// This provider's own public key, so callers can recognize
    /// self-addressed votes.
    fn public_key(&self) -> PublicKey;
}

/// Reference [`CryptoProvider`] backed by `ed25519-dalek`.
pub struct Ed25519CryptoProvider {
    signing_key: SigningKey,
}

impl Ed25519CryptoProvider {
    /// Generates a fresh keypair via the OS RNG. Preferred for tests and
    /// the demo binary; production callers that need a stable identity
    /// across restarts should use [`Self::from_seed`].
    pub fn generate() -> Self {
        use rand::rngs::OsRng;
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Reconstructs a signing key deterministically from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }
}

impl CryptoProvider for Ed25519CryptoProvider {
    fn verify(&self, votes: &[Vote]) -> bool {
        votes.iter().all(|vote| {
            let Ok(verifying_key) = VerifyingKey::from_bytes(&vote.signature.public_key.0) else {
                return false;
            };
            let Ok(sig) = ed25519_dalek::Signature::try_from(vote.signature.bytes.as_slice())
            else {
                return false;
            };
            verifying_key
                .verify(&vote.hash.signable_payload(), &sig)
                .is_ok()
        })
    }

    fn get_vote(&self, hash: YacHash) -> Vote {
        let payload = hash.signable_payload();
        let sig = self.signing_key.sign(&payload);
        let signature = Signature {
            public_key: PublicKey(self.signing_key.verifying_key().to_bytes()),
            bytes: sig.to_bytes(),
        };
        Vote::new(hash, signature)
    }

    fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }
}

mod hex_bytes_32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let v = hex::decode(s).map_err(serde::de::Error::custom)?;
        v.try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

mod hex_bytes_64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 64], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 64], D::Error> {
        let s = String::deserialize(d)?;
        let v = hex::decode(s).map_err(serde::de::Error::custom)?;
        v.try_into()
            .map_err(|_| serde::de::Error::custom("expected 64 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::Round;

    #[test]
    fn round_trip_sign_and_verify() {
        let provider = Ed25519CryptoProvider::generate();
        let hash = YacHash::new(Round::genesis(), "p", "b");
        let vote = provider.get_vote(hash);
        assert!(provider.verify(&[vote]));
    }

    #[test]
    fn tampered_hash_fails_verification() {
        let provider = Ed25519CryptoProvider::generate();
        let hash = YacHash::new(Round::genesis(), "p", "b");
        let mut vote = provider.get_vote(hash);
        vote.hash.proposal_hash = "tampered".into();
        assert!(!provider.verify(&[vote]));
    }

    #[test]
    fn foreign_signer_signature_rejected_by_different_public_key_check() {
        let a = Ed25519CryptoProvider::generate();
        let b = Ed25519CryptoProvider::generate();
        let hash = YacHash::new(Round::genesis(), "p", "b");
        let mut vote = a.get_vote(hash);
        // Swap in b's public key while keeping a's signature: must fail.
        vote.signature.public_key = b.public_key();
        assert!(!a.verify(&[vote]));
    }

    #[test]
    fn batch_with_one_bad_signature_fails_whole_batch() {
        let provider = Ed25519CryptoProvider::generate();
        let good = provider.get_vote(YacHash::new(Round::genesis(), "p", "b"));
        let mut bad = provider.get_vote(YacHash::new(Round::genesis(), "p2", "b2"));
        bad.hash.proposal_hash = "tampered".into();
        assert!(!provider.verify(&[good, bad]));
    }
}
