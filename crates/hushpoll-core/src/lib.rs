//! hushpoll core - anonymous commit-reveal polling
//!
//! This crate implements the state machine behind one-person-one-vote
//! anonymous polling: votes are hidden until a deadline (commit-reveal),
//! voter identity is never linkable to a choice (zero-knowledge membership
//! proofs over a Merkle roster), and no identity can vote twice
//! (per-poll nullifiers).
//!
//! # Components
//!
//! - `field` - scalar field elements, canonical 32-byte big-endian
//! - `hash` - domain-separated leaf/node hashes, commitments, nullifiers
//! - `merkle` - fixed-depth membership tree builder and paths
//! - `poll` - per-poll aggregate (tally, nullifier set, derived phase)
//! - `registry` - poll lifecycle: creation, resolution, queries
//! - `reveal` - the reveal processor, single and batched
//! - `verifier` - the external proof-verifier contract
//! - `events` - append-only event log
//! - `mirror` - eventually-consistent read replica fed by events
//!
//! Proof *generation* is out of scope: the core consumes an opaque
//! [`verifier::ProofVerifier`] and the fixed four-element public-input
//! vector `[commitment, nullifier, poll_id, membership_root]`.

pub mod error;
pub mod events;
pub mod field;
pub mod hash;
pub mod merkle;
pub mod mirror;
pub mod poll;
pub mod registry;
pub mod reveal;
pub mod verifier;

// Re-exports for convenience
pub use error::{PollError, PollResult};
pub use events::{Event, EventLog, EventRecord};
pub use field::Fe;
pub use merkle::{MembershipTree, MerklePath, TREE_DEPTH};
pub use mirror::{PollMirror, PollSummary};
pub use poll::{Phase, Poll, PollId, Timestamp};
pub use registry::PollRegistry;
pub use reveal::{RevealProcessor, RevealRequest};
pub use verifier::{DigestVerifier, ProofVerifier, PublicInputs, PUBLIC_INPUT_LEN};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{PollError, PollResult};
    pub use crate::events::{Event, EventRecord};
    pub use crate::field::Fe;
    pub use crate::merkle::{MembershipTree, MerklePath};
    pub use crate::mirror::PollMirror;
    pub use crate::poll::{Phase, Poll, PollId, Timestamp};
    pub use crate::registry::PollRegistry;
    pub use crate::reveal::{RevealProcessor, RevealRequest};
    pub use crate::verifier::{DigestVerifier, ProofVerifier, PublicInputs};
}
