//! Registry domain names under which components are published.

pub const STAKING: &str = "Staking";
pub const BALLOT_STORAGE: &str = "BallotStorage";
pub const ENV_STORAGE: &str = "EnvStorage";
pub const GOVERNANCE: &str = "GovernanceContract";
