//! hushpoll CLI types

use hushpoll_core::field::Fe;
use hushpoll_core::merkle::{MembershipTree, MerklePath};
use hushpoll_core::reveal::RevealRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reveal ready for submission, as written by `hushpoll prove`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealBundle {
    pub poll_id: u64,
    pub choice: u32,
    pub commitment: Fe,
    pub nullifier: Fe,
    /// Hex-encoded proof blob.
    pub proof: String,
    pub public_inputs: Vec<Fe>,
}

impl RevealBundle {
    pub fn to_request(&self) -> Result<RevealRequest, hex::FromHexError> {
        let proof = hex::decode(self.proof.trim_start_matches("0x"))?;
        Ok(RevealRequest {
            choice: self.choice,
            commitment: self.commitment,
            nullifier: self.nullifier,
            proof,
            public_inputs: self.public_inputs.clone(),
        })
    }
}

/// Membership tree output, as written by `hushpoll roster`.
///
/// Paths are keyed by the member secret exactly as it appeared in the
/// roster file, so provers can look themselves up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterOutput {
    pub root: Fe,
    pub depth: usize,
    pub paths: BTreeMap<String, MerklePath>,
}

impl RosterOutput {
    pub fn from_tree(tree: &MembershipTree, raw_members: &[String]) -> Self {
        let paths = raw_members
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| tree.path(i).map(|p| (raw.clone(), p.clone())))
            .collect();
        Self {
            root: tree.root(),
            depth: hushpoll_core::merkle::TREE_DEPTH,
            paths,
        }
    }
}
