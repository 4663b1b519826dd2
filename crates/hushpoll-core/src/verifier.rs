//! Proof verification interface
//!
//! The proving toolchain is external to this crate: the core only ever
//! consumes a boolean verification result over a proof blob and the fixed
//! four-element public-input vector. Anything satisfying [`ProofVerifier`]
//! can sit behind the reveal processor: a Groth16 verifier, a STARK
//! verifier, or the in-process [`DigestVerifier`] stand-in.

use crate::field::Fe;
use crate::hash::keccak_hash;
use crate::poll::PollId;
use serde::{Deserialize, Serialize};

/// Required number of public inputs.
pub const PUBLIC_INPUT_LEN: usize = 4;

/// The fixed-order public statement a reveal proof is bound to.
///
/// Wire order is `[commitment, nullifier, poll_id, membership_root]`, each
/// encoded as a 32-byte big-endian field element. This ordering is the
/// contract between the off-line proof generator and the verifier; it must
/// never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInputs {
    pub commitment: Fe,
    pub nullifier: Fe,
    pub poll_id: Fe,
    pub membership_root: Fe,
}

impl PublicInputs {
    pub fn new(commitment: Fe, nullifier: Fe, poll_id: PollId, membership_root: Fe) -> Self {
        Self {
            commitment,
            nullifier,
            poll_id: Fe::from_u64(poll_id),
            membership_root,
        }
    }

    /// The inputs in wire order.
    pub fn as_array(&self) -> [Fe; PUBLIC_INPUT_LEN] {
        [
            self.commitment,
            self.nullifier,
            self.poll_id,
            self.membership_root,
        ]
    }

    /// Bit-exact wire encoding: 4 x 32 bytes, big-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PUBLIC_INPUT_LEN * 32);
        for fe in self.as_array() {
            bytes.extend_from_slice(&fe.to_bytes());
        }
        bytes
    }

    /// Whether a caller-supplied vector matches this statement exactly:
    /// same length, same order and the same values.
    pub fn matches(&self, supplied: &[Fe]) -> bool {
        supplied.len() == PUBLIC_INPUT_LEN && supplied == self.as_array().as_slice()
    }
}

/// A synchronous, side-effect-free proof predicate.
pub trait ProofVerifier {
    /// Returns true iff `proof` is valid for the given public statement.
    fn verify(&self, proof: &[u8], public_inputs: &PublicInputs) -> bool;
}

impl<V: ProofVerifier + ?Sized> ProofVerifier for &V {
    fn verify(&self, proof: &[u8], public_inputs: &PublicInputs) -> bool {
        (**self).verify(proof, public_inputs)
    }
}

/// Domain tag for digest proofs.
const PROOF_DOMAIN: &[u8] = b"hushpoll.proof.v1";

/// Hash-bound stand-in for the external proving toolchain.
///
/// A "proof" is the keccak digest of the domain-tagged public-input
/// encoding, so a proof produced by [`DigestVerifier::prove`] verifies
/// against exactly one statement and nothing else. Useful for local
/// flows and tests; carries none of the soundness of a real ZK system.
#[derive(Clone, Copy, Debug, Default)]
pub struct DigestVerifier;

impl DigestVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Produce the digest proof for a statement.
    pub fn prove(&self, public_inputs: &PublicInputs) -> Vec<u8> {
        keccak_hash(&[PROOF_DOMAIN, &public_inputs.to_bytes()]).to_vec()
    }
}

impl ProofVerifier for DigestVerifier {
    fn verify(&self, proof: &[u8], public_inputs: &PublicInputs) -> bool {
        proof == self.prove(public_inputs).as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> PublicInputs {
        PublicInputs::new(Fe::from_u64(11), Fe::from_u64(22), 3, Fe::from_u64(44))
    }

    #[test]
    fn test_wire_encoding_is_fixed_order() {
        let inputs = sample_inputs();
        let bytes = inputs.to_bytes();
        assert_eq!(bytes.len(), 128);
        assert_eq!(&bytes[0..32], &Fe::from_u64(11).to_bytes());
        assert_eq!(&bytes[32..64], &Fe::from_u64(22).to_bytes());
        assert_eq!(&bytes[64..96], &Fe::from_u64(3).to_bytes());
        assert_eq!(&bytes[96..128], &Fe::from_u64(44).to_bytes());
    }

    #[test]
    fn test_matches_rejects_permutations() {
        let inputs = sample_inputs();
        assert!(inputs.matches(&inputs.as_array()));

        let mut swapped = inputs.as_array();
        swapped.swap(0, 1);
        assert!(!inputs.matches(&swapped));

        assert!(!inputs.matches(&inputs.as_array()[..3]));
        let mut extended = inputs.as_array().to_vec();
        extended.push(Fe::ZERO);
        assert!(!inputs.matches(&extended));
    }

    #[test]
    fn test_digest_proof_round_trip() {
        let verifier = DigestVerifier::new();
        let inputs = sample_inputs();
        let proof = verifier.prove(&inputs);

        assert!(verifier.verify(&proof, &inputs));
        assert!(!verifier.verify(b"garbage", &inputs));

        // A proof for one statement does not verify against another.
        let other = PublicInputs::new(Fe::from_u64(11), Fe::from_u64(22), 4, Fe::from_u64(44));
        assert!(!verifier.verify(&proof, &other));
    }
}
