//! Comprehensive tests for the membership tree builder

use hushpoll_core::field::Fe;
use hushpoll_core::hash::{hash1, hash2};
use hushpoll_core::merkle::{MembershipTree, MerklePath, TREE_DEPTH, ZERO_LEAF};
use proptest::prelude::*;

fn roster(n: u64) -> Vec<Fe> {
    (0..n).map(|i| Fe::from_u64(0xA000 + i)).collect()
}

// === Structure tests ===

#[test]
fn test_root_has_fixed_depth() {
    // Whatever the roster size, the root sits exactly TREE_DEPTH levels
    // above the leaves: a member path always has TREE_DEPTH steps.
    for n in [1u64, 2, 3, 4, 7, 16, 33] {
        let tree = MembershipTree::build(&roster(n)).unwrap();
        for path in tree.paths() {
            assert_eq!(path.depth(), TREE_DEPTH, "roster size {}", n);
        }
    }
}

#[test]
fn test_member_count_excludes_padding() {
    let tree = MembershipTree::build(&roster(3)).unwrap();
    assert_eq!(tree.member_count(), 3);
    assert!(tree.path(2).is_some());
    assert!(tree.path(3).is_none());
}

#[test]
fn test_leaf_is_single_input_hash_of_secret() {
    let members = roster(2);
    let tree = MembershipTree::build(&members).unwrap();
    assert_eq!(tree.leaf(0), Some(hash1(members[0])));
    assert_eq!(tree.leaf(1), Some(hash1(members[1])));
}

// === Path semantics ===

#[test]
fn test_all_paths_verify_against_root() {
    for n in [1u64, 2, 3, 5, 8, 21] {
        let members = roster(n);
        let tree = MembershipTree::build(&members).unwrap();
        for (i, secret) in members.iter().enumerate() {
            let path = tree.path(i).unwrap();
            assert!(path.verify(hash1(*secret), tree.root()));
        }
    }
}

#[test]
fn test_single_member_zero_extension() {
    // A one-member roster has no siblings anywhere: all bits are "left"
    // and every sibling is the zero leaf, through all 20 levels.
    let members = roster(1);
    let tree = MembershipTree::build(&members).unwrap();
    let path = tree.path(0).unwrap();

    assert_eq!(path.bits, vec![0u8; TREE_DEPTH]);
    assert!(path.siblings.iter().all(|s| *s == ZERO_LEAF));

    // And the root is the leaf hashed with zero TREE_DEPTH times.
    let mut expected = hash1(members[0]);
    for _ in 0..TREE_DEPTH {
        expected = hash2(expected, ZERO_LEAF);
    }
    assert_eq!(tree.root(), expected);
}

#[test]
fn test_two_member_tree_shape() {
    let members = roster(2);
    let tree = MembershipTree::build(&members).unwrap();

    // Natural subtree of depth 1: members are each other's siblings.
    let left = tree.path(0).unwrap();
    let right = tree.path(1).unwrap();
    assert_eq!(left.bits[0], 0);
    assert_eq!(right.bits[0], 1);
    assert_eq!(left.siblings[0], hash1(members[1]));
    assert_eq!(right.siblings[0], hash1(members[0]));

    // Everything above the natural subtree is zero extension.
    assert!(left.siblings[1..].iter().all(|s| *s == ZERO_LEAF));
    assert!(left.bits[1..].iter().all(|&b| b == 0));
}

#[test]
fn test_path_rejects_wrong_member() {
    let members = roster(4);
    let tree = MembershipTree::build(&members).unwrap();

    // Using member 1's path with member 0's leaf must fail.
    let path = tree.path(1).unwrap();
    assert!(!path.verify(hash1(members[0]), tree.root()));
}

#[test]
fn test_path_rejects_wrong_root() {
    let members = roster(4);
    let tree = MembershipTree::build(&members).unwrap();
    let other = MembershipTree::build(&roster(5)).unwrap();

    let path = tree.path(0).unwrap();
    assert!(!path.verify(hash1(members[0]), other.root()));
}

#[test]
fn test_tampered_path_fails() {
    let members = roster(4);
    let tree = MembershipTree::build(&members).unwrap();

    let mut path: MerklePath = tree.path(0).unwrap().clone();
    path.siblings[3] = Fe::from_u64(999);
    assert!(!path.verify(hash1(members[0]), tree.root()));
}

// === Determinism and sensitivity ===

#[test]
fn test_identical_roster_identical_tree() {
    let members = roster(9);
    let a = MembershipTree::build(&members).unwrap();
    let b = MembershipTree::build(&members).unwrap();
    assert_eq!(a.root(), b.root());
    assert_eq!(a.paths(), b.paths());
}

#[test]
fn test_any_member_change_moves_root() {
    let members = roster(6);
    let base = MembershipTree::build(&members).unwrap();

    for i in 0..members.len() {
        let mut changed = members.clone();
        changed[i] = Fe::from_u64(0xF000 + i as u64);
        let tree = MembershipTree::build(&changed).unwrap();
        assert_ne!(base.root(), tree.root(), "member {} change ignored", i);
    }
}

proptest! {
    #[test]
    fn prop_tree_is_deterministic(secrets in proptest::collection::vec(any::<u64>(), 0..40)) {
        let members: Vec<Fe> = secrets.iter().map(|s| Fe::from_u64(*s)).collect();
        let a = MembershipTree::build(&members).unwrap();
        let b = MembershipTree::build(&members).unwrap();
        prop_assert_eq!(a.root(), b.root());
        prop_assert_eq!(a.paths(), b.paths());
    }

    #[test]
    fn prop_every_path_verifies(secrets in proptest::collection::vec(1u64..u64::MAX, 1..40)) {
        let members: Vec<Fe> = secrets.iter().map(|s| Fe::from_u64(*s)).collect();
        let tree = MembershipTree::build(&members).unwrap();
        for (i, secret) in members.iter().enumerate() {
            prop_assert!(tree.path(i).unwrap().verify(hash1(*secret), tree.root()));
        }
    }
}
