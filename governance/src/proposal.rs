//! Proposal inputs and vote receipts.

use stakegov_ballot::{BallotId, BallotState, VoteId};
use stakegov_types::{Address, Node, VarType};

/// Nominate `candidate` for membership, backed by `stake_amount` of their collateral.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddMemberProposal {
    pub candidate: Address,
    pub node: Node,
    pub stake_amount: u128,
    pub memo: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveMemberProposal {
    pub target: Address,
    /// Collateral released back to `target` on acceptance.
    pub stake_amount: u128,
    pub memo: String,
}

/// Hand `old_member`'s seat to `new_member`, or with `old == new` just
/// re-declare the node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeMemberProposal {
    pub old_member: Address,
    pub new_member: Address,
    pub node: Node,
    pub stake_amount: u128,
    pub memo: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEnvProposal {
    pub name: String,
    pub var_type: VarType,
    pub value: Vec<u8>,
    pub memo: String,
}

/// What a successful vote did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteReceipt {
    pub vote_id: VoteId,
    pub ballot_id: BallotId,
    pub power: u128,
    /// Ballot state after the vote; terminal when this vote decided it.
    pub state: BallotState,
}

impl VoteReceipt {
    pub fn finalized(&self) -> bool {
        self.state.is_terminal()
    }
}
