//! Poll state
//!
//! A poll owns its own tally vector, nullifier set and commitment set;
//! there is no shared global map keyed by poll id. The phase is derived
//! from wall-clock time on every query rather than stored, so a
//! long-running process can never observe a stale phase.

use crate::field::Fe;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Monotonically assigned poll identifier.
pub type PollId = u64;

/// Timestamps are unix seconds.
pub type Timestamp = i64;

/// The time window a poll is currently in.
///
/// `Resolved` here means the reveal window has closed; it is distinct from
/// the persisted `resolved` flag, which means the operator has recorded
/// the outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Commit,
    Reveal,
    Resolved,
}

impl Phase {
    /// Derive the phase from the two deadlines. Pure function of time.
    pub fn from_times(now: Timestamp, commit_end: Timestamp, reveal_end: Timestamp) -> Self {
        if now >= reveal_end {
            Phase::Resolved
        } else if now >= commit_end {
            Phase::Reveal
        } else {
            Phase::Commit
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Commit => "commit",
            Phase::Reveal => "reveal",
            Phase::Resolved => "resolved",
        };
        f.write_str(name)
    }
}

/// One question under vote.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
    pub commit_end: Timestamp,
    pub reveal_end: Timestamp,
    /// Snapshot of eligible voters; immutable after creation.
    pub membership_root: Fe,
    pub resolved: bool,
    pub correct_option: Option<u32>,
    /// Per-option count of successful reveals.
    pub tally: Vec<u64>,
    /// Nullifiers consumed by successful reveals. Grows monotonically.
    nullifiers: HashSet<Fe>,
    /// Commitments seen during the commit phase. Liveness aid, not
    /// required for correctness.
    commitments: HashSet<Fe>,
}

impl Poll {
    pub(crate) fn new(
        id: PollId,
        question: String,
        options: Vec<String>,
        commit_end: Timestamp,
        reveal_end: Timestamp,
        membership_root: Fe,
    ) -> Self {
        let tally = vec![0; options.len()];
        Self {
            id,
            question,
            options,
            commit_end,
            reveal_end,
            membership_root,
            resolved: false,
            correct_option: None,
            tally,
            nullifiers: HashSet::new(),
            commitments: HashSet::new(),
        }
    }

    /// Current phase of this poll. Never cached.
    pub fn phase(&self, now: Timestamp) -> Phase {
        Phase::from_times(now, self.commit_end, self.reveal_end)
    }

    /// Whether a nullifier was already consumed for this poll.
    pub fn nullifier_used(&self, nullifier: &Fe) -> bool {
        self.nullifiers.contains(nullifier)
    }

    /// Mark a nullifier consumed; returns false if it was already present.
    pub(crate) fn consume_nullifier(&mut self, nullifier: Fe) -> bool {
        self.nullifiers.insert(nullifier)
    }

    /// Whether a commitment hash was recorded during the commit phase.
    pub fn commitment_seen(&self, commitment: &Fe) -> bool {
        self.commitments.contains(commitment)
    }

    /// Record a commitment hash; returns false if it was already present.
    pub(crate) fn record_commitment(&mut self, commitment: Fe) -> bool {
        self.commitments.insert(commitment)
    }

    /// Total number of successful reveals.
    pub fn total_reveals(&self) -> u64 {
        self.tally.iter().sum()
    }

    /// Number of nullifiers consumed so far.
    pub fn nullifier_count(&self) -> usize {
        self.nullifiers.len()
    }
}
