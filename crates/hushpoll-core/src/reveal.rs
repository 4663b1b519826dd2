//! Reveal processing
//!
//! The only path by which a vote becomes counted. Each reveal is checked
//! cheapest-first: phase window, choice bound, nullifier freshness, then
//! the public-input binding, and only then the verifier call. The
//! nullifier is marked used strictly *after* verification succeeds, so a
//! garbage proof cannot burn a voter's slot for the poll.
//!
//! Batches apply element-wise semantics in array order with no partial
//! commit: effects are staged while every element is validated and only
//! then written back, so a failure on any element leaves the poll
//! untouched.

use crate::error::{PollError, PollResult};
use crate::events::Event;
use crate::field::Fe;
use crate::poll::{Phase, Poll, PollId, Timestamp};
use crate::registry::PollRegistry;
use crate::verifier::{ProofVerifier, PublicInputs};
use itertools::izip;
use std::collections::HashSet;
use tracing::{debug, info};

/// One voter's reveal submission.
#[derive(Clone, Debug)]
pub struct RevealRequest {
    pub choice: u32,
    pub commitment: Fe,
    pub nullifier: Fe,
    pub proof: Vec<u8>,
    pub public_inputs: Vec<Fe>,
}

/// Validates and applies reveal operations against a registry.
#[derive(Clone, Debug)]
pub struct RevealProcessor<V> {
    verifier: V,
}

impl<V: ProofVerifier> RevealProcessor<V> {
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Validate and count a single reveal.
    ///
    /// On success the nullifier is consumed, exactly one tally slot is
    /// incremented and a `VoteRevealed` event is emitted. On any failure
    /// nothing changes.
    pub fn reveal(
        &self,
        registry: &mut PollRegistry,
        poll_id: PollId,
        request: &RevealRequest,
        now: Timestamp,
    ) -> PollResult<()> {
        let no_staged = HashSet::new();
        let poll = registry.get_poll(poll_id)?;
        self.check_reveal(poll, request, now, &no_staged)?;

        apply_reveal(registry, poll_id, request.choice, request.nullifier)?;
        debug!(poll_id, choice = request.choice, nullifier = %request.nullifier, "vote revealed");
        Ok(())
    }

    /// Validate and count a batch of reveals, all-or-nothing.
    ///
    /// This is the relayer's entry point: it amortizes fixed per-call
    /// overhead across many independent voters' reveals. All five arrays
    /// must have the same length. The first failing element's error is
    /// returned and the whole batch is discarded.
    pub fn batch_reveal(
        &self,
        registry: &mut PollRegistry,
        poll_id: PollId,
        choices: &[u32],
        commitments: &[Fe],
        nullifiers: &[Fe],
        proofs: &[Vec<u8>],
        public_inputs: &[Vec<Fe>],
        now: Timestamp,
    ) -> PollResult<u32> {
        let len = choices.len();
        if commitments.len() != len
            || nullifiers.len() != len
            || proofs.len() != len
            || public_inputs.len() != len
        {
            return Err(PollError::LengthMismatch);
        }

        // Validate every element against the poll plus the batch's own
        // staged nullifiers; nothing is written until all of them pass.
        let poll = registry.get_poll(poll_id)?;
        let mut staged: HashSet<Fe> = HashSet::with_capacity(len);
        for (choice, commitment, nullifier, proof, inputs) in
            izip!(choices, commitments, nullifiers, proofs, public_inputs)
        {
            let request = RevealRequest {
                choice: *choice,
                commitment: *commitment,
                nullifier: *nullifier,
                proof: proof.clone(),
                public_inputs: inputs.clone(),
            };
            self.check_reveal(poll, &request, now, &staged)?;
            staged.insert(*nullifier);
        }

        for (choice, nullifier) in izip!(choices, nullifiers) {
            apply_reveal(registry, poll_id, *choice, *nullifier)?;
        }

        info!(poll_id, count = len, "batch reveal applied");
        Ok(len as u32)
    }

    /// Per-element validation: phase, choice bound, nullifier freshness,
    /// public-input binding, proof. Side-effect free.
    fn check_reveal(
        &self,
        poll: &Poll,
        request: &RevealRequest,
        now: Timestamp,
        staged: &HashSet<Fe>,
    ) -> PollResult<()> {
        let phase = poll.phase(now);
        if phase != Phase::Reveal {
            return Err(PollError::InvalidPhase {
                expected: Phase::Reveal,
                actual: phase,
            });
        }
        if request.choice as usize >= poll.options.len() {
            return Err(PollError::InvalidChoice {
                choice: request.choice,
                options: poll.options.len(),
            });
        }
        if poll.nullifier_used(&request.nullifier) || staged.contains(&request.nullifier) {
            return Err(PollError::NullifierAlreadyUsed);
        }

        // Binding check: the supplied public inputs must equal the
        // statement this reveal claims, exactly and in order, before the
        // verifier is ever invoked. This is what stops proof replay
        // against a different statement.
        let statement = PublicInputs::new(
            request.commitment,
            request.nullifier,
            poll.id,
            poll.membership_root,
        );
        if !statement.matches(&request.public_inputs) {
            return Err(PollError::VerifyFailed(
                "public inputs do not match the reveal statement".into(),
            ));
        }
        if !self.verifier.verify(&request.proof, &statement) {
            return Err(PollError::VerifyFailed(
                "proof rejected by the verifier".into(),
            ));
        }
        Ok(())
    }
}

fn apply_reveal(
    registry: &mut PollRegistry,
    poll_id: PollId,
    choice: u32,
    nullifier: Fe,
) -> PollResult<()> {
    let poll = registry.poll_mut(poll_id)?;
    let fresh = poll.consume_nullifier(nullifier);
    debug_assert!(fresh, "nullifier freshness was checked before applying");
    poll.tally[choice as usize] += 1;

    registry.append_event(Event::VoteRevealed {
        poll_id,
        choice,
        nullifier,
    });
    Ok(())
}
