//! Staked, single-flight governance.
//!
//! Members propose changes (membership, delegate logic, environment
//! variables) as ballots; votes are weighted by each member's share of locked
//! collateral. Only one ballot collects votes at a time, and a ballot is
//! decided the moment either side crosses the bound logic's threshold.
//!
//! [`GovernanceSystem`] is the entry point: it owns the staking ledger, the
//! ballot storage, the environment store and the engine, and applies every
//! operation all-or-nothing.

pub mod config;
pub mod engine;
pub mod error;
pub mod logic;
pub mod member;
pub mod proposal;
pub mod system;

pub use config::{ContractsConfig, GovernanceConfig};
pub use engine::{GovContext, GovernanceEngine};
pub use error::GovernanceError;
pub use logic::{GovernanceLogic, LogicCatalog, MajorityLogic, SupermajorityLogic, Tally};
pub use member::{MemberEntry, MemberSet};
pub use proposal::{
    AddMemberProposal, ChangeEnvProposal, ChangeMemberProposal, RemoveMemberProposal, VoteReceipt,
};
pub use system::GovernanceSystem;
