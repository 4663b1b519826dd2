//! Membership tree builder
//!
//! Builds a fixed-depth binary Merkle tree over hashed identity secrets.
//! The resulting root is stored on the poll at creation time; the
//! per-member sibling paths are consumed by the off-line proving step,
//! never by the verifier directly.
//!
//! Small rosters still produce a root compatible with a fixed-depth
//! circuit: the leaf list is padded with the zero leaf to a power of two,
//! and the natural root is then extended by hashing with the zero leaf
//! until the tree reaches exactly [`TREE_DEPTH`] levels.

use crate::error::{PollError, PollResult};
use crate::field::Fe;
use crate::hash::{hash1, hash2};
use serde::{Deserialize, Serialize};

/// Fixed tree depth (supports 2^TREE_DEPTH members)
pub const TREE_DEPTH: usize = 20;

/// The designated zero-leaf value used for padding and extension.
pub const ZERO_LEAF: Fe = Fe::ZERO;

/// A Merkle authentication path from a leaf to the root.
///
/// `bits[k]` is 0 when the node at level `k` is a left child and 1 when it
/// is a right child; `siblings[k]` is its partner at that level. Levels
/// above a small roster's natural subtree carry bit 0 and the zero leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    pub bits: Vec<u8>,
    pub siblings: Vec<Fe>,
}

impl MerklePath {
    /// Recompute the root implied by this path for the given leaf.
    pub fn compute_root(&self, leaf: Fe) -> Fe {
        let mut node = leaf;
        for (bit, sibling) in self.bits.iter().zip(&self.siblings) {
            node = if *bit == 0 {
                hash2(node, *sibling)
            } else {
                hash2(*sibling, node)
            };
        }
        node
    }

    /// Check this path against a leaf and an expected root.
    pub fn verify(&self, leaf: Fe, root: Fe) -> bool {
        self.compute_root(leaf) == root
    }

    /// Number of levels in this path.
    pub fn depth(&self) -> usize {
        self.bits.len()
    }
}

/// A membership tree snapshot: root plus one path per roster member.
#[derive(Clone, Debug)]
pub struct MembershipTree {
    root: Fe,
    leaves: Vec<Fe>,
    paths: Vec<MerklePath>,
}

impl MembershipTree {
    /// Build the tree from an ordered roster of identity secrets.
    ///
    /// Leaf `i` is `hash1(roster[i])`. The same ordered roster always
    /// produces the same root and the same per-member paths.
    pub fn build(roster: &[Fe]) -> PollResult<Self> {
        if roster.len() > (1usize << TREE_DEPTH) {
            return Err(PollError::RosterTooLarge(roster.len()));
        }

        let leaves: Vec<Fe> = roster.iter().map(|secret| hash1(*secret)).collect();

        // Pad with the zero leaf up to the next power of two >= max(1, n).
        let padded = leaves.len().max(1).next_power_of_two();
        let mut current: Vec<Fe> = leaves.clone();
        current.resize(padded, ZERO_LEAF);

        // Build bottom-up; an odd trailing node pairs with the zero leaf.
        let mut levels = Vec::new();
        while current.len() > 1 {
            let next: Vec<Fe> = current
                .chunks(2)
                .map(|pair| hash2(pair[0], pair.get(1).copied().unwrap_or(ZERO_LEAF)))
                .collect();
            levels.push(current);
            current = next;
        }
        levels.push(current);

        let natural_depth = levels.len() - 1;
        debug_assert!(natural_depth <= TREE_DEPTH);

        // Extend the natural root with zero-leaf partners up to full depth.
        let mut root = levels[natural_depth][0];
        for _ in natural_depth..TREE_DEPTH {
            root = hash2(root, ZERO_LEAF);
        }

        let paths = (0..leaves.len())
            .map(|index| member_path(&levels, natural_depth, index))
            .collect();

        Ok(Self { root, leaves, paths })
    }

    /// The root of the fixed-depth tree.
    pub fn root(&self) -> Fe {
        self.root
    }

    /// Number of roster members (excludes padding).
    pub fn member_count(&self) -> usize {
        self.leaves.len()
    }

    /// The hashed leaf for a member, if the index is in range.
    pub fn leaf(&self, member: usize) -> Option<Fe> {
        self.leaves.get(member).copied()
    }

    /// The authentication path for a member, if the index is in range.
    pub fn path(&self, member: usize) -> Option<&MerklePath> {
        self.paths.get(member)
    }

    /// All member paths, in roster order.
    pub fn paths(&self) -> &[MerklePath] {
        &self.paths
    }
}

fn member_path(levels: &[Vec<Fe>], natural_depth: usize, leaf_index: usize) -> MerklePath {
    let mut bits = Vec::with_capacity(TREE_DEPTH);
    let mut siblings = Vec::with_capacity(TREE_DEPTH);

    let mut index = leaf_index;
    for level in levels.iter().take(natural_depth) {
        bits.push((index & 1) as u8);
        siblings.push(level.get(index ^ 1).copied().unwrap_or(ZERO_LEAF));
        index >>= 1;
    }

    // Zero-extension levels: always a left child paired with the zero leaf.
    for _ in natural_depth..TREE_DEPTH {
        bits.push(0);
        siblings.push(ZERO_LEAF);
    }

    MerklePath { bits, siblings }
}
