//! Shared utilities for the staked governance workspace.

pub mod logging;
pub mod time;

pub use logging::{init_tracing, LogFormat, LoggingError};
pub use time::format_duration;
