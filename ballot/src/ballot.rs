//! Ballot records and their type-tagged payloads.

use crate::error::BallotError;
use serde::{Deserialize, Serialize};
use stakegov_types::{Address, Node, Timestamp, VarType};

pub type BallotId = u64;

/// What a ballot proposes to change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallotType {
    AddMember,
    RemoveMember,
    ChangeMember,
    ChangeGov,
    ChangeEnv,
}

impl BallotType {
    pub fn code(&self) -> u8 {
        match self {
            Self::AddMember => 1,
            Self::RemoveMember => 2,
            Self::ChangeMember => 3,
            Self::ChangeGov => 4,
            Self::ChangeEnv => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::AddMember),
            2 => Some(Self::RemoveMember),
            3 => Some(Self::ChangeMember),
            4 => Some(Self::ChangeGov),
            5 => Some(Self::ChangeEnv),
            _ => None,
        }
    }

    /// Membership ballots carry a [`MemberProposal`].
    pub fn is_member_type(&self) -> bool {
        matches!(
            self,
            Self::AddMember | Self::RemoveMember | Self::ChangeMember
        )
    }
}

/// Lifecycle state of a ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallotState {
    /// No such ballot.
    Invalid,
    Ready,
    InProgress,
    Accepted,
    Rejected,
}

impl BallotState {
    pub fn code(&self) -> u8 {
        match self {
            Self::Invalid => 0,
            Self::Ready => 1,
            Self::InProgress => 2,
            Self::Accepted => 3,
            Self::Rejected => 4,
        }
    }

    /// Unknown codes map to `Invalid`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Ready,
            2 => Self::InProgress,
            3 => Self::Accepted,
            4 => Self::Rejected,
            _ => Self::Invalid,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

/// Type-specific content of a ballot, one variant per [`BallotType`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotPayload {
    AddMember {
        member: Address,
        node: Node,
        stake_amount: u128,
    },
    RemoveMember {
        member: Address,
        stake_amount: u128,
    },
    ChangeMember {
        old_member: Address,
        new_member: Address,
        node: Node,
        stake_amount: u128,
    },
    ChangeGov {
        new_logic: Address,
    },
    ChangeEnv {
        name: String,
        var_type: VarType,
        value: Vec<u8>,
    },
}

impl BallotPayload {
    pub fn ballot_type(&self) -> BallotType {
        match self {
            Self::AddMember { .. } => BallotType::AddMember,
            Self::RemoveMember { .. } => BallotType::RemoveMember,
            Self::ChangeMember { .. } => BallotType::ChangeMember,
            Self::ChangeGov { .. } => BallotType::ChangeGov,
            Self::ChangeEnv { .. } => BallotType::ChangeEnv,
        }
    }
}

/// Fields shared by every ballot creation call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BallotHeader {
    pub id: BallotId,
    pub ballot_type: BallotType,
    pub creator: Address,
    pub memo: String,
    /// Nominal voting window in seconds, recorded at creation.
    pub duration: u64,
}

/// Flat membership-ballot input; unused fields are left empty.
///
/// Validated against the ballot type by [`MemberProposal::into_payload`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberProposal {
    pub old_member: Address,
    pub new_member: Address,
    pub node: Node,
    pub stake_amount: u128,
}

impl MemberProposal {
    pub fn add(member: Address, node: Node, stake_amount: u128) -> Self {
        Self {
            old_member: Address::ZERO,
            new_member: member,
            node,
            stake_amount,
        }
    }

    pub fn remove(member: Address, stake_amount: u128) -> Self {
        Self {
            old_member: member,
            new_member: Address::ZERO,
            node: Node::empty(),
            stake_amount,
        }
    }

    pub fn change(old_member: Address, new_member: Address, node: Node, stake_amount: u128) -> Self {
        Self {
            old_member,
            new_member,
            node,
            stake_amount,
        }
    }

    /// Check the field combination `ballot_type` requires and build the payload.
    pub fn into_payload(self, ballot_type: BallotType) -> Result<BallotPayload, BallotError> {
        let invalid = |reason| BallotError::InvalidPayload {
            ballot_type,
            reason,
        };
        match ballot_type {
            BallotType::AddMember => {
                if !self.old_member.is_zero() {
                    return Err(invalid("old member must be empty"));
                }
                if self.new_member.is_zero() {
                    return Err(invalid("new member must be set"));
                }
                if !self.node.is_complete() {
                    return Err(invalid("endpoint key, host and port must be set"));
                }
                Ok(BallotPayload::AddMember {
                    member: self.new_member,
                    node: self.node,
                    stake_amount: self.stake_amount,
                })
            }
            BallotType::RemoveMember => {
                if self.old_member.is_zero() {
                    return Err(invalid("old member must be set"));
                }
                if !self.new_member.is_zero() {
                    return Err(invalid("new member must be empty"));
                }
                if !self.node.is_empty() {
                    return Err(invalid("endpoint fields must be empty"));
                }
                Ok(BallotPayload::RemoveMember {
                    member: self.old_member,
                    stake_amount: self.stake_amount,
                })
            }
            BallotType::ChangeMember => {
                if self.old_member.is_zero() || self.new_member.is_zero() {
                    return Err(invalid("old and new member must be set"));
                }
                if !self.node.is_complete() {
                    return Err(invalid("endpoint key, host and port must be set"));
                }
                Ok(BallotPayload::ChangeMember {
                    old_member: self.old_member,
                    new_member: self.new_member,
                    node: self.node,
                    stake_amount: self.stake_amount,
                })
            }
            other => Err(BallotError::WrongType(other)),
        }
    }
}

/// A persisted proposal and its running tally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub id: BallotId,
    pub creator: Address,
    pub memo: String,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub duration: u64,
    pub state: BallotState,
    pub finalized: bool,
    pub total_voters: u32,
    pub power_of_accepts: u128,
    pub power_of_rejects: u128,
    pub payload: BallotPayload,
}

impl Ballot {
    pub(crate) fn new(header: BallotHeader, payload: BallotPayload) -> Self {
        Self {
            id: header.id,
            creator: header.creator,
            memo: header.memo,
            start_time: None,
            end_time: None,
            duration: header.duration,
            state: BallotState::Ready,
            finalized: false,
            total_voters: 0,
            power_of_accepts: 0,
            power_of_rejects: 0,
            payload,
        }
    }

    pub fn ballot_type(&self) -> BallotType {
        self.payload.ballot_type()
    }

    pub fn period(&self) -> BallotPeriod {
        BallotPeriod {
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration,
        }
    }
}

/// Timing view of a ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BallotPeriod {
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub duration: u64,
}

/// Flat view of a membership ballot, empty fields where the type has none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberBallotDetail {
    pub id: BallotId,
    pub old_member: Address,
    pub new_member: Address,
    pub node: Node,
    pub stake_amount: u128,
}

impl MemberBallotDetail {
    pub(crate) fn from_ballot(ballot: &Ballot) -> Option<Self> {
        let (old_member, new_member, node, stake_amount) = match &ballot.payload {
            BallotPayload::AddMember {
                member,
                node,
                stake_amount,
            } => (Address::ZERO, *member, node.clone(), *stake_amount),
            BallotPayload::RemoveMember {
                member,
                stake_amount,
            } => (*member, Address::ZERO, Node::empty(), *stake_amount),
            BallotPayload::ChangeMember {
                old_member,
                new_member,
                node,
                stake_amount,
            } => (*old_member, *new_member, node.clone(), *stake_amount),
            _ => return None,
        };
        Some(Self {
            id: ballot.id,
            old_member,
            new_member,
            node,
            stake_amount,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableBallotDetail {
    pub id: BallotId,
    pub name: String,
    pub var_type: VarType,
    pub value: Vec<u8>,
}
