use stakegov_types::{Address, ErrorKind, VarType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("{0} is not the governance engine")]
    Unauthorized(Address),

    #[error("variable name must not be empty")]
    EmptyName,

    #[error("variable type must not be Invalid")]
    InvalidType,

    #[error("value of {len} bytes does not fit type {var_type:?}")]
    ValueMismatch { var_type: VarType, len: usize },

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl EnvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::EmptyName | Self::InvalidType | Self::ValueMismatch { .. } => {
                ErrorKind::InvalidParameter
            }
            Self::Snapshot(_) => ErrorKind::Storage,
        }
    }
}
