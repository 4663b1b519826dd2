//! Protocol events
//!
//! Every state mutation appends one event to an append-only log, in the
//! order the mutations were applied. The off-chain mirror (and any other
//! consumer) replays this log; consumers must be idempotent against
//! redelivery, keyed by the record's sequence number.
//!
//! `VoteRevealed` deliberately carries only the choice and the nullifier
//! (no commitment, no identity), so the public event stream reveals
//! nothing beyond what the tally already does.

use crate::field::Fe;
use crate::poll::{PollId, Timestamp};
use serde::{Deserialize, Serialize};

/// A protocol event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    PollCreated {
        id: PollId,
        question: String,
        options: Vec<String>,
        commit_end: Timestamp,
        reveal_end: Timestamp,
        membership_root: Fe,
    },
    Committed {
        poll_id: PollId,
        commitment: Fe,
    },
    VoteRevealed {
        poll_id: PollId,
        choice: u32,
        nullifier: Fe,
    },
    PollResolved {
        poll_id: PollId,
        correct_option: u32,
    },
}

/// An event plus its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique, strictly increasing sequence number.
    pub seq: u64,
    pub event: Event,
}

/// Append-only event log with strictly increasing sequence numbers.
///
/// Draining hands records to a consumer without resetting the sequence,
/// so replayed and late-drained records stay distinguishable.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
    next_seq: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, assigning it the next sequence number.
    pub fn append(&mut self, event: Event) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.records.push(EventRecord { seq, event });
        seq
    }

    /// Records not yet drained, in order.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Remove and return all pending records. Sequence numbering continues.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_survives_drain() {
        let mut log = EventLog::new();
        log.append(Event::Committed {
            poll_id: 0,
            commitment: Fe::from_u64(1),
        });
        log.append(Event::Committed {
            poll_id: 0,
            commitment: Fe::from_u64(2),
        });

        let first = log.drain();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].seq, 0);
        assert_eq!(first[1].seq, 1);
        assert!(log.is_empty());

        log.append(Event::PollResolved {
            poll_id: 0,
            correct_option: 1,
        });
        assert_eq!(log.records()[0].seq, 2);
    }
}
