//! Environment variable type tags.

use serde::{Deserialize, Serialize};

/// Type tag of a governance-controlled environment variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarType {
    Invalid,
    Int,
    Uint,
    Address,
    Bytes32,
    Bytes,
    String,
}

impl VarType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Invalid => 0,
            Self::Int => 1,
            Self::Uint => 2,
            Self::Address => 3,
            Self::Bytes32 => 4,
            Self::Bytes => 5,
            Self::String => 6,
        }
    }

    /// Unknown codes map to `Invalid`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Int,
            2 => Self::Uint,
            3 => Self::Address,
            4 => Self::Bytes32,
            5 => Self::Bytes,
            6 => Self::String,
            _ => Self::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }
}
