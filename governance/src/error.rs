use stakegov_ballot::{BallotError, BallotId};
use stakegov_env::EnvError;
use stakegov_registry::RegistryError;
use stakegov_staking::StakingError;
use stakegov_store::StoreError;
use stakegov_types::{Address, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("{0} is not the owner")]
    NotOwner(Address),

    #[error("{0} is not a member")]
    NotMember(Address),

    #[error("governance is already initialized")]
    AlreadyInitialized,

    #[error("member {0} not found")]
    MemberNotFound(Address),

    #[error("ballot {0} not found")]
    BallotNotFound(BallotId),

    #[error("{0} is already a member")]
    AlreadyMember(Address),

    #[error("a member cannot propose themselves")]
    SelfNomination,

    #[error("{0} is the only remaining member")]
    SoleMember(Address),

    #[error("stake amount must be non-zero")]
    ZeroStake,

    #[error("stake {needed} exceeds locked collateral {locked}")]
    StakeExceedsLocked { needed: u128, locked: u128 },

    #[error("endpoint key, host and port must all be set")]
    IncompleteNode,

    #[error("invalid governance logic {0}")]
    InvalidLogic(Address),

    #[error("governance logic {0} is not registered")]
    LogicUnavailable(Address),

    #[error("invalid ballot storage {0}")]
    InvalidStorage(Address),

    #[error("ballot {0} is already finalized")]
    BallotFinalized(BallotId),

    #[error("ballot {active} holds the voting slot")]
    VotingInProgress { active: BallotId },

    #[error("{voter} has already voted on ballot {ballot}")]
    AlreadyVoted { ballot: BallotId, voter: Address },

    #[error("staking: {0}")]
    Staking(#[from] StakingError),

    #[error("ballot storage: {0}")]
    Ballot(#[from] BallotError),

    #[error("environment storage: {0}")]
    Env(#[from] EnvError),

    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("state store: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner(_) | Self::NotMember(_) => ErrorKind::Unauthorized,
            Self::AlreadyInitialized
            | Self::LogicUnavailable(_)
            | Self::BallotFinalized(_) => ErrorKind::InvalidState,
            Self::MemberNotFound(_) | Self::BallotNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyMember(_)
            | Self::SelfNomination
            | Self::ZeroStake
            | Self::IncompleteNode
            | Self::InvalidLogic(_)
            | Self::InvalidStorage(_)
            | Self::Config(_) => ErrorKind::InvalidParameter,
            Self::SoleMember(_) => ErrorKind::SoleMemberViolation,
            Self::StakeExceedsLocked { .. } => ErrorKind::InsufficientBalance,
            Self::VotingInProgress { .. } => ErrorKind::VotingInProgress,
            Self::AlreadyVoted { .. } => ErrorKind::AlreadyVoted,
            Self::Staking(e) => e.kind(),
            Self::Ballot(e) => e.kind(),
            Self::Env(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::Snapshot(_) => ErrorKind::Storage,
        }
    }
}
