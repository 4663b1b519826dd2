//! Off-chain mirror
//!
//! An eventually-consistent read replica of poll state, fed by the event
//! log. The mirror is never authoritative: nullifier uniqueness and phase
//! gating live in the registry and reveal processor, and nothing on the
//! write path consults the mirror. Applying the same event record twice
//! is a no-op (idempotent upsert keyed by sequence number), so consumers
//! can replay the feed freely after a crash.

use crate::events::{Event, EventRecord};
use crate::field::Fe;
use crate::poll::{PollId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Mirrored view of one poll.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollSummary {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
    pub commit_end: Timestamp,
    pub reveal_end: Timestamp,
    pub membership_root: Fe,
    pub resolved: bool,
    pub correct_option: Option<u32>,
    pub vote_counts: Vec<u64>,
    pub commitments: HashSet<Fe>,
    pub nullifiers: HashSet<Fe>,
}

/// Event-driven replica of registry state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PollMirror {
    applied: HashSet<u64>,
    polls: BTreeMap<PollId, PollSummary>,
    /// Off-chain safety net: identities that already committed, per poll.
    /// Identity never appears in the event stream, so this is fed by the
    /// commit-phase plumbing, not by `apply`.
    identity_commits: HashSet<(PollId, Fe)>,
}

impl PollMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event record. Redelivery is a no-op.
    pub fn apply(&mut self, record: &EventRecord) {
        if !self.applied.insert(record.seq) {
            debug!(seq = record.seq, "event replayed, skipping");
            return;
        }

        match &record.event {
            Event::PollCreated {
                id,
                question,
                options,
                commit_end,
                reveal_end,
                membership_root,
            } => {
                let vote_counts = vec![0; options.len()];
                self.polls.insert(
                    *id,
                    PollSummary {
                        id: *id,
                        question: question.clone(),
                        options: options.clone(),
                        commit_end: *commit_end,
                        reveal_end: *reveal_end,
                        membership_root: *membership_root,
                        resolved: false,
                        correct_option: None,
                        vote_counts,
                        commitments: HashSet::new(),
                        nullifiers: HashSet::new(),
                    },
                );
            }
            Event::Committed {
                poll_id,
                commitment,
            } => {
                if let Some(poll) = self.polls.get_mut(poll_id) {
                    poll.commitments.insert(*commitment);
                } else {
                    warn!(poll_id = *poll_id, seq = record.seq, "commit event for unknown poll");
                }
            }
            Event::VoteRevealed {
                poll_id,
                choice,
                nullifier,
            } => {
                if let Some(poll) = self.polls.get_mut(poll_id) {
                    if poll.nullifiers.insert(*nullifier) {
                        if let Some(count) = poll.vote_counts.get_mut(*choice as usize) {
                            *count += 1;
                        }
                    }
                } else {
                    warn!(poll_id = *poll_id, seq = record.seq, "reveal event for unknown poll");
                }
            }
            Event::PollResolved {
                poll_id,
                correct_option,
            } => {
                if let Some(poll) = self.polls.get_mut(poll_id) {
                    poll.resolved = true;
                    poll.correct_option = Some(*correct_option);
                } else {
                    warn!(poll_id = *poll_id, seq = record.seq, "resolve event for unknown poll");
                }
            }
        }
    }

    /// Apply a slice of records in order.
    pub fn apply_all(&mut self, records: &[EventRecord]) {
        for record in records {
            self.apply(record);
        }
    }

    /// Mirrored view of a poll, if its creation event was seen.
    pub fn poll(&self, poll_id: PollId) -> Option<&PollSummary> {
        self.polls.get(&poll_id)
    }

    /// Mirrored vote counts for a poll.
    pub fn vote_counts(&self, poll_id: PollId) -> Option<&[u64]> {
        self.polls.get(&poll_id).map(|p| p.vote_counts.as_slice())
    }

    /// All mirrored polls in id order.
    pub fn polls(&self) -> impl Iterator<Item = &PollSummary> {
        self.polls.values()
    }

    /// Record that an identity committed to a poll. Returns false if the
    /// identity already has a commitment there. This is the one-per-identity
    /// safety net for the commit-phase plumbing.
    pub fn note_identity_commit(&mut self, poll_id: PollId, identity: Fe) -> bool {
        self.identity_commits.insert((poll_id, identity))
    }

    /// Whether an identity already committed to a poll.
    pub fn identity_committed(&self, poll_id: PollId, identity: &Fe) -> bool {
        self.identity_commits.contains(&(poll_id, *identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(seq: u64, id: PollId) -> EventRecord {
        EventRecord {
            seq,
            event: Event::PollCreated {
                id,
                question: "q".into(),
                options: vec!["a".into(), "b".into()],
                commit_end: 100,
                reveal_end: 200,
                membership_root: Fe::from_u64(7),
            },
        }
    }

    fn revealed(seq: u64, poll_id: PollId, choice: u32, nullifier: u64) -> EventRecord {
        EventRecord {
            seq,
            event: Event::VoteRevealed {
                poll_id,
                choice,
                nullifier: Fe::from_u64(nullifier),
            },
        }
    }

    #[test]
    fn test_replay_is_idempotent() {
        let mut mirror = PollMirror::new();
        mirror.apply(&created(0, 0));
        let reveal = revealed(1, 0, 1, 99);
        mirror.apply(&reveal);
        mirror.apply(&reveal);
        mirror.apply(&reveal);

        assert_eq!(mirror.vote_counts(0).unwrap(), &[0, 1]);
    }

    #[test]
    fn test_unknown_poll_events_are_tolerated() {
        let mut mirror = PollMirror::new();
        // No creation event seen yet; must not panic or corrupt state.
        mirror.apply(&revealed(0, 42, 0, 1));
        assert!(mirror.poll(42).is_none());
    }

    #[test]
    fn test_identity_safety_net() {
        let mut mirror = PollMirror::new();
        let id = Fe::from_u64(5);
        assert!(mirror.note_identity_commit(0, id));
        assert!(!mirror.note_identity_commit(0, id));
        assert!(mirror.identity_committed(0, &id));
        // Same identity is free to commit on a different poll.
        assert!(mirror.note_identity_commit(1, id));
    }
}
