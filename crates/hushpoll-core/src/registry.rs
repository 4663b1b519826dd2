//! Poll registry
//!
//! The single source of truth for poll lifecycle: creation, phase
//! computation and resolution. Every mutating operation takes `&mut self`,
//! so mutations are serialized by construction; callers that share a
//! registry across threads wrap it in a mutex and keep each operation
//! inside one lock acquisition.

use crate::error::{PollError, PollResult};
use crate::events::{Event, EventLog, EventRecord};
use crate::field::Fe;
use crate::poll::{Phase, Poll, PollId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Owns all polls and the append-only event log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollRegistry {
    operator: String,
    polls: BTreeMap<PollId, Poll>,
    next_id: PollId,
    events: EventLog,
}

impl PollRegistry {
    /// Create a registry with a single authorized operator.
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            polls: BTreeMap::new(),
            next_id: 0,
            events: EventLog::new(),
        }
    }

    /// The configured operator identity.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Create a poll. Operator-only.
    ///
    /// Requires at least two options and `now < commit_end < reveal_end`.
    /// Allocates the next sequential id and emits `PollCreated`.
    pub fn create_poll(
        &mut self,
        caller: &str,
        question: &str,
        options: Vec<String>,
        commit_end: Timestamp,
        reveal_end: Timestamp,
        membership_root: Fe,
        now: Timestamp,
    ) -> PollResult<PollId> {
        if caller != self.operator {
            return Err(PollError::Unauthorized);
        }
        if options.len() < 2 {
            return Err(PollError::InvalidConfiguration(
                "a poll needs at least two options".into(),
            ));
        }
        if commit_end <= now {
            return Err(PollError::InvalidConfiguration(
                "commit deadline must be in the future".into(),
            ));
        }
        if reveal_end <= commit_end {
            return Err(PollError::InvalidConfiguration(
                "reveal deadline must come after the commit deadline".into(),
            ));
        }

        let id = self.next_id;
        self.next_id += 1;

        let poll = Poll::new(
            id,
            question.to_string(),
            options.clone(),
            commit_end,
            reveal_end,
            membership_root,
        );
        self.polls.insert(id, poll);
        self.events.append(Event::PollCreated {
            id,
            question: question.to_string(),
            options,
            commit_end,
            reveal_end,
            membership_root,
        });

        info!(poll_id = id, commit_end, reveal_end, root = %membership_root, "poll created");
        Ok(id)
    }

    /// Record a commitment hash during the commit phase.
    ///
    /// Off-chain bookkeeping, not required for correctness. Returns whether
    /// the commitment was newly recorded; `Committed` is emitted only for
    /// fresh commitments, so replaying a commit is harmless.
    pub fn record_commit(
        &mut self,
        poll_id: PollId,
        commitment: Fe,
        now: Timestamp,
    ) -> PollResult<bool> {
        let poll = self.poll_mut(poll_id)?;
        let phase = poll.phase(now);
        if phase != Phase::Commit {
            return Err(PollError::InvalidPhase {
                expected: Phase::Commit,
                actual: phase,
            });
        }

        let fresh = poll.record_commitment(commitment);
        if fresh {
            self.events.append(Event::Committed {
                poll_id,
                commitment,
            });
            debug!(poll_id, commitment = %commitment, "commitment recorded");
        }
        Ok(fresh)
    }

    /// Record the poll outcome. Operator-only, after the reveal window,
    /// exactly once.
    pub fn resolve(
        &mut self,
        caller: &str,
        poll_id: PollId,
        correct_option: u32,
        now: Timestamp,
    ) -> PollResult<()> {
        if caller != self.operator {
            return Err(PollError::Unauthorized);
        }
        let poll = self.poll_mut(poll_id)?;
        if poll.phase(now) != Phase::Resolved {
            return Err(PollError::NotYetRevealable);
        }
        if poll.resolved {
            return Err(PollError::AlreadyResolved);
        }
        if correct_option as usize >= poll.options.len() {
            return Err(PollError::InvalidOption);
        }

        poll.resolved = true;
        poll.correct_option = Some(correct_option);
        self.events.append(Event::PollResolved {
            poll_id,
            correct_option,
        });

        info!(poll_id, correct_option, "poll resolved");
        Ok(())
    }

    /// Look up a poll.
    pub fn get_poll(&self, poll_id: PollId) -> PollResult<&Poll> {
        self.polls
            .get(&poll_id)
            .ok_or(PollError::PollNotFound(poll_id))
    }

    /// The per-option tally of a poll.
    pub fn get_tally(&self, poll_id: PollId) -> PollResult<&[u64]> {
        Ok(&self.get_poll(poll_id)?.tally)
    }

    /// The current phase of a poll.
    pub fn phase_of(&self, poll_id: PollId, now: Timestamp) -> PollResult<Phase> {
        Ok(self.get_poll(poll_id)?.phase(now))
    }

    /// All polls in id order.
    pub fn polls(&self) -> impl Iterator<Item = &Poll> {
        self.polls.values()
    }

    /// Number of polls ever created.
    pub fn poll_count(&self) -> usize {
        self.polls.len()
    }

    /// Events not yet handed to a consumer.
    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    /// Hand all pending events to a consumer.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    pub(crate) fn poll_mut(&mut self, poll_id: PollId) -> PollResult<&mut Poll> {
        self.polls
            .get_mut(&poll_id)
            .ok_or(PollError::PollNotFound(poll_id))
    }

    pub(crate) fn append_event(&mut self, event: Event) {
        self.events.append(event);
    }
}
