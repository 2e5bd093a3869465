//! Governance configuration with TOML file support.

use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};
use stakegov_types::Address;
use stakegov_utils::{LogFormat, LoggingError};
use std::path::Path;

/// Identities under which each component is published in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractsConfig {
    #[serde(default = "default_staking")]
    pub staking: Address,

    #[serde(default = "default_ballot_storage")]
    pub ballot_storage: Address,

    #[serde(default = "default_env_storage")]
    pub env_storage: Address,

    #[serde(default = "default_governance")]
    pub governance: Address,
}

/// Configuration for a governance system.
///
/// Loaded from TOML via [`GovernanceConfig::from_toml_file`] or built in code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Nominal voting window recorded on each ballot.
    #[serde(default = "default_voting_duration_secs")]
    pub voting_duration_secs: u64,

    /// Scale at which voting weight is computed (100 = percent).
    #[serde(default = "default_weight_scale")]
    pub weight_scale: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Level filter, e.g. `"info"` or `"debug,stakegov_governance=trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub contracts: ContractsConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_voting_duration_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_weight_scale() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_staking() -> Address {
    Address::from_low_u64(0x1000)
}

fn default_ballot_storage() -> Address {
    Address::from_low_u64(0x1001)
}

fn default_env_storage() -> Address {
    Address::from_low_u64(0x1002)
}

fn default_governance() -> Address {
    Address::from_low_u64(0x1003)
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernanceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self =
            toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Install the global tracing subscriber with this config's format and level.
    pub fn init_tracing(&self) -> Result<(), LoggingError> {
        stakegov_utils::init_tracing(self.log_format, &self.log_level)
    }

    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.weight_scale == 0 {
            return Err(GovernanceError::Config(
                "weight_scale must be non-zero".to_string(),
            ));
        }
        let c = &self.contracts;
        let ids = [c.staking, c.ballot_storage, c.env_storage, c.governance];
        if ids.iter().any(Address::is_zero) {
            return Err(GovernanceError::Config(
                "contract identities must be non-null".to_string(),
            ));
        }
        for (i, a) in ids.iter().enumerate() {
            if ids[i + 1..].contains(a) {
                return Err(GovernanceError::Config(format!(
                    "contract identity {} is used twice",
                    a
                )));
            }
        }
        Ok(())
    }
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            staking: default_staking(),
            ballot_storage: default_ballot_storage(),
            env_storage: default_env_storage(),
            governance: default_governance(),
        }
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            voting_duration_secs: default_voting_duration_secs(),
            weight_scale: default_weight_scale(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            contracts: ContractsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakegov_types::ErrorKind;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = GovernanceConfig::from_toml_str("").unwrap();
        assert_eq!(config, GovernanceConfig::default());
        assert_eq!(config.voting_duration_secs, 604_800);
        assert_eq!(config.weight_scale, 100);
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn parses_overrides_and_hex_addresses() {
        let toml = r#"
            weight_scale = 1000
            log_format = "json"
            log_level = "debug"

            [contracts]
            governance = "0x00000000000000000000000000000000000000aa"
        "#;
        let config = GovernanceConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.weight_scale, 1000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.contracts.governance, Address::from_low_u64(0xaa));
        assert_eq!(config.contracts.staking, default_staking());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = GovernanceConfig::default();
        config.voting_duration_secs = 3_600;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("0x0000000000000000000000000000000000001003"));
        assert_eq!(GovernanceConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_zero_scale_and_shared_identities() {
        let err = GovernanceConfig::from_toml_str("weight_scale = 0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let toml = r#"
            [contracts]
            staking = "0x0000000000000000000000000000000000001003"
        "#;
        assert!(GovernanceConfig::from_toml_str(toml).is_err());
    }
}
