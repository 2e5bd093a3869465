use crate::ballot::{BallotId, BallotState, BallotType};
use crate::vote::VoteId;
use stakegov_types::{Address, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BallotError {
    #[error("{0} is not the governance engine")]
    Unauthorized(Address),

    #[error("{0} is not the owner of this ballot storage")]
    NotOwner(Address),

    #[error("ballot storage has been superseded and no longer accepts ballots")]
    Disabled,

    #[error("ballot {0} already exists")]
    BallotExists(BallotId),

    #[error("ballot {0} not found")]
    BallotNotFound(BallotId),

    #[error("vote {0} already exists")]
    VoteExists(VoteId),

    #[error("{voter} has already voted on ballot {ballot}")]
    AlreadyVoted { ballot: BallotId, voter: Address },

    #[error("ballot type {0:?} cannot be created through this entry point")]
    WrongType(BallotType),

    #[error("invalid {ballot_type:?} payload: {reason}")]
    InvalidPayload {
        ballot_type: BallotType,
        reason: &'static str,
    },

    #[error("ballot window ends ({end}) before it starts ({start})")]
    InvalidPeriod { start: u64, end: u64 },

    #[error("ballot {id} is {from:?}, cannot move to {to:?}")]
    InvalidTransition {
        id: BallotId,
        from: BallotState,
        to: BallotState,
    },

    #[error("{0:?} is not a terminal ballot state")]
    NotTerminal(BallotState),

    #[error("invalid previous ballot storage {0}")]
    InvalidPrevious(Address),

    #[error("previous ballot storage already set to {0}")]
    PreviousAlreadySet(Address),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl BallotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) | Self::NotOwner(_) => ErrorKind::Unauthorized,
            Self::BallotNotFound(_) => ErrorKind::NotFound,
            Self::BallotExists(_) | Self::VoteExists(_) => ErrorKind::AlreadyExists,
            Self::AlreadyVoted { .. } => ErrorKind::AlreadyVoted,
            Self::Disabled | Self::InvalidTransition { .. } | Self::PreviousAlreadySet(_) => {
                ErrorKind::InvalidState
            }
            Self::WrongType(_)
            | Self::InvalidPayload { .. }
            | Self::InvalidPeriod { .. }
            | Self::NotTerminal(_)
            | Self::InvalidPrevious(_) => ErrorKind::InvalidParameter,
            Self::Snapshot(_) => ErrorKind::Storage,
        }
    }
}
