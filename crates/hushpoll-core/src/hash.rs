//! Hash functions for the polling protocol
//!
//! Provides the domain-separated hash functions binding the protocol
//! together:
//! - leaf hash (single input) for membership-tree leaves
//! - node hash (two inputs) for tree pairing, commitments and nullifiers
//!
//! All inputs are canonical field elements; outputs are reduced back into
//! the field so that every protocol value stays in range.

use crate::field::Fe;
use rand::rngs::OsRng;
use rand::RngCore;
use sha3::{Digest, Keccak256};

/// Domain tag for single-input leaf hashing.
const LEAF_DOMAIN: &[u8] = b"hushpoll.leaf.v1";

/// Domain tag for two-input hashing (tree nodes, commitments, nullifiers).
const NODE_DOMAIN: &[u8] = b"hushpoll.node.v1";

/// Domain tag for identity-secret derivation.
const IDENTITY_DOMAIN: &[u8] = b"hushpoll.identity.v1";

/// Hash arbitrary inputs with keccak256.
///
/// Concatenates all inputs and returns the raw 32-byte digest.
pub fn keccak_hash(inputs: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for input in inputs {
        hasher.update(input);
    }
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Single-input hash, used for membership-tree leaves.
pub fn hash1(x: Fe) -> Fe {
    let digest = keccak_hash(&[LEAF_DOMAIN, x.as_bytes()]);
    Fe::from_bytes_mod_order(&digest)
}

/// Two-input hash, used for tree pairing, commitments and nullifiers.
///
/// Domain-separated from [`hash1`]; order of inputs matters.
pub fn hash2(a: Fe, b: Fe) -> Fe {
    let digest = keccak_hash(&[NODE_DOMAIN, a.as_bytes(), b.as_bytes()]);
    Fe::from_bytes_mod_order(&digest)
}

/// Commitment binding a choice to a per-poll secret.
///
/// Revealed later to prove the choice without earlier disclosure.
pub fn commitment(choice: u32, secret: Fe) -> Fe {
    hash2(Fe::from_u64(choice as u64), secret)
}

/// Nullifier binding an identity secret to a specific poll.
///
/// The same identity produces a different nullifier per poll, and the
/// same nullifier whenever it retries the same poll. That reproducibility
/// is what makes double votes detectable without revealing who voted.
pub fn nullifier(identity_secret: Fe, poll_id: u64) -> Fe {
    hash2(identity_secret, Fe::from_u64(poll_id))
}

/// Derive an identity secret from a user handle and a deployment salt.
pub fn derive_identity_secret(handle: &str, salt: &str) -> Fe {
    let digest = keccak_hash(&[IDENTITY_DOMAIN, salt.as_bytes(), handle.as_bytes()]);
    Fe::from_bytes_mod_order(&digest)
}

/// Mint a fresh random secret from the OS entropy source.
pub fn random_secret() -> Fe {
    let mut buf = [0u8; 32];
    OsRng.fill_bytes(&mut buf);
    Fe::from_bytes_mod_order(&buf)
}
