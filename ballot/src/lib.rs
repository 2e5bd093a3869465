//! Ballot store for staked governance.
//!
//! Ballots move through `Ready → InProgress → {Accepted | Rejected}`; the
//! terminal states never change again. Only the identity the registry
//! currently designates as the governance engine may create ballots, start
//! them, record votes or finalize them. A store superseded in the registry by
//! a newer instance refuses further ballot creation but stays readable.

pub mod ballot;
pub mod error;
pub mod storage;
pub mod vote;

pub use ballot::{
    Ballot, BallotHeader, BallotId, BallotPayload, BallotPeriod, BallotState, BallotType,
    MemberBallotDetail, MemberProposal, VariableBallotDetail,
};
pub use error::BallotError;
pub use storage::BallotStorage;
pub use vote::{Decision, Vote, VoteId};
