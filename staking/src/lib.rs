//! Staking ledger: the collateral side of governance.
//!
//! Participants deposit funds; the governance engine locks part of them as
//! membership collateral. Voting weight is a participant's share of all
//! locked collateral:
//!
//! `weight(p, scale) = floor(locked(p) × scale / Σ locked)`
//!
//! Truncation is per participant and never corrected, so the weights at a
//! given scale sum to at most `scale`.

pub mod account;
pub mod error;
pub mod ledger;

pub use account::Account;
pub use error::StakingError;
pub use ledger::{StakingLedger, DEFAULT_WEIGHT_SCALE};
