//! A member's declared network endpoint.

use crate::endpoint::EndpointKey;
use serde::{Deserialize, Serialize};

/// Node record paired one-to-one with a governance member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub endpoint_key: EndpointKey,
    pub host: String,
    pub port: u16,
}

impl Node {
    pub fn new(endpoint_key: EndpointKey, host: impl Into<String>, port: u16) -> Self {
        Self {
            endpoint_key,
            host: host.into(),
            port,
        }
    }

    /// An endpoint with no key, host or port, as carried by removal ballots.
    pub fn empty() -> Self {
        Self {
            endpoint_key: EndpointKey::empty(),
            host: String::new(),
            port: 0,
        }
    }

    /// All of key, host and port are set.
    pub fn is_complete(&self) -> bool {
        !self.endpoint_key.is_empty() && !self.host.is_empty() && self.port != 0
    }

    /// None of key, host or port is set.
    pub fn is_empty(&self) -> bool {
        self.endpoint_key.is_empty() && self.host.is_empty() && self.port == 0
    }
}
