//! Participant / component identity.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A 20-byte identity for participants and for the components themselves
/// (staking ledger, ballot storage, governance engine, ...).
///
/// The all-zero address is the null reference: "no member", "unset domain".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address must be 20 bytes, got {0}")]
    Length(usize),

    #[error("invalid hex: {0}")]
    Hex(String),
}

impl Address {
    pub const LEN: usize = 20;
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// An address with every byte set to `byte`. Handy for fixtures.
    pub fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// An address whose low 8 bytes hold `n` big-endian.
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressParseError> {
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| AddressParseError::Length(bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| AddressParseError::Hex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

// Hex string for config files, raw bytes for bincode snapshots.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(D::Error::custom)
        } else {
            <[u8; 20]>::deserialize(deserializer).map(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_null_reference() {
        assert!(Address::ZERO.is_zero());
        assert!(Address::default().is_zero());
        assert!(!Address::from_low_u64(1).is_zero());
    }

    #[test]
    fn display_and_parse_agree() {
        let addr = Address::from_low_u64(0xdead_beef);
        let shown = addr.to_string();
        assert_eq!(shown, "0x00000000000000000000000000000000deadbeef");
        assert_eq!(shown.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_eq!(
            "0xabbb12".parse::<Address>(),
            Err(AddressParseError::Length(3))
        );
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(AddressParseError::Hex(_))
        ));
    }

    #[test]
    fn json_uses_hex_string() {
        let addr = Address::repeat_byte(0x11);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn bincode_uses_raw_bytes() {
        let addr = Address::repeat_byte(0x22);
        let encoded = bincode::serialize(&addr).unwrap();
        assert_eq!(encoded.len(), Address::LEN);
        let decoded: Address = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, addr);
    }
}
