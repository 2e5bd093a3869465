//! Structured logging initialisation via `tracing`.
//!
//! Two output formats:
//! - [`LogFormat::Human`]: readable lines for development.
//! - [`LogFormat::Json`]: newline-delimited JSON for log aggregation.
//!
//! `RUST_LOG` overrides the caller-supplied level when set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::{fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => f.write_str("human"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log format: {0}")]
    UnknownFormat(String),

    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Install the global tracing subscriber.
///
/// Fails instead of panicking when a subscriber is already set, so tests
/// and embedders can call it more than once.
pub fn init_tracing(format: LogFormat, level: &str) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|e| LoggingError::Filter(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Human => registry.with(tfmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(tfmt::layer().json().with_target(true))
            .try_init(),
    };
    result.map_err(|_| LoggingError::AlreadyInitialized)
}
