//! Error taxonomy for the polling core
//!
//! Every fallible operation fails fast with one of these kinds and leaves
//! no partial state behind. Callers can sort the kinds into "retry later"
//! (phase errors), "never retry" (replay and verification errors) and
//! "operator misconfiguration" (configuration errors).

use crate::poll::{Phase, PollId};
use thiserror::Error;

/// Result alias used throughout the core.
pub type PollResult<T> = Result<T, PollError>;

/// Errors surfaced by the poll registry and reveal processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// Malformed poll parameters at creation; nothing was stored.
    #[error("invalid poll configuration: {0}")]
    InvalidConfiguration(String),

    /// Caller is not the configured operator.
    #[error("caller is not the poll operator")]
    Unauthorized,

    /// The poll id was never created.
    #[error("poll {0} does not exist")]
    PollNotFound(PollId),

    /// Operation attempted outside its valid time window.
    #[error("poll is in the {actual} phase, operation requires {expected}")]
    InvalidPhase { expected: Phase, actual: Phase },

    /// Choice index is out of range for the poll's options.
    #[error("choice index {choice} out of range for {options} options")]
    InvalidChoice { choice: u32, options: usize },

    /// The nullifier was already consumed by a successful reveal.
    #[error("nullifier already used for this poll")]
    NullifierAlreadyUsed,

    /// Batch arrays do not all have the same length.
    #[error("batch arrays have mismatched lengths")]
    LengthMismatch,

    /// Public-input binding mismatch or cryptographic rejection.
    #[error("proof verification failed: {0}")]
    VerifyFailed(String),

    /// The poll outcome was already recorded.
    #[error("poll already resolved")]
    AlreadyResolved,

    /// Resolution attempted before the reveal window closed.
    #[error("poll cannot be resolved before the reveal phase ends")]
    NotYetRevealable,

    /// The recorded outcome index is out of range.
    #[error("correct option index out of range")]
    InvalidOption,

    /// The membership roster exceeds the fixed tree capacity.
    #[error("roster of {0} members exceeds the tree capacity")]
    RosterTooLarge(usize),
}
