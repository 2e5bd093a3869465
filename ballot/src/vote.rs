//! Vote records.

use crate::ballot::BallotId;
use serde::{Deserialize, Serialize};
use stakegov_types::Address;

pub type VoteId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn from_approve(approve: bool) -> Self {
        if approve {
            Self::Accept
        } else {
            Self::Reject
        }
    }
}

/// A single recorded vote. Immutable once stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub ballot_id: BallotId,
    pub voter: Address,
    pub decision: Decision,
    /// Voting weight of `voter` at the time of the vote.
    pub power: u128,
}
