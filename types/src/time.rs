//! Ballot timing.
//!
//! The engine never reads a clock. Every operation that records a time takes
//! `now` from the caller, so replaying the same inputs gives the same state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix epoch seconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Saturates at `u64::MAX` instead of wrapping, so an end time is never
    /// earlier than its start.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl From<u64> for Timestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}", self.0)
    }
}
