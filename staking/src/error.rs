//! Staking-specific errors.

use stakegov_types::{Address, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("insufficient available balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient locked balance: need {needed}, locked {locked}")]
    InsufficientLocked { needed: u128, locked: u128 },

    #[error("{0} is not the governance engine")]
    Unauthorized(Address),

    #[error("null participant address")]
    NullParticipant,

    #[error("arithmetic overflow in staking computation")]
    Overflow,

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl StakingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAmount | Self::NullParticipant | Self::Overflow => {
                ErrorKind::InvalidParameter
            }
            Self::InsufficientBalance { .. } | Self::InsufficientLocked { .. } => {
                ErrorKind::InsufficientBalance
            }
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Snapshot(_) => ErrorKind::Storage,
        }
    }
}
