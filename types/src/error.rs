//! The error taxonomy shared across crates.
//!
//! Each crate keeps its own descriptive error enum; every one of them can be
//! classified into an [`ErrorKind`] so callers can match uniformly.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller lacks the required role or identity.
    Unauthorized,
    /// Referenced ballot, member or account is absent.
    NotFound,
    /// Duplicate ballot or vote id.
    AlreadyExists,
    /// Illegal state transition.
    InvalidState,
    /// Zero, empty or self-referential argument, or an invalid tag.
    InvalidParameter,
    /// Collateral operation exceeds available or locked funds.
    InsufficientBalance,
    AlreadyVoted,
    /// Another ballot holds the voting slot.
    VotingInProgress,
    /// Attempt to remove the last remaining member.
    SoleMemberViolation,
    /// Snapshot persistence failed.
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
