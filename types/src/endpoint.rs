//! Node endpoint key (the 64-byte public key a member's node is reachable under).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-size binary node identifier.
///
/// Stored as a byte vector so that "empty" is representable in ballot
/// payloads (a removal carries no endpoint). Non-empty keys are always
/// exactly [`EndpointKey::LEN`] bytes.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EndpointKey(Vec<u8>);

impl EndpointKey {
    pub const LEN: usize = 64;

    /// Build a key from raw bytes. Returns `None` unless `bytes` is empty or exactly 64 bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Option<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() || bytes.len() == Self::LEN {
            Some(Self(bytes))
        } else {
            None
        }
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "EndpointKey(empty)")
        } else {
            write!(f, "EndpointKey({}..)", hex::encode(&self.0[..4]))
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}
