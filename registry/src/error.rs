use stakegov_types::{Address, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{0} is not the registry owner")]
    NotOwner(Address),

    #[error("domain name must not be empty")]
    EmptyDomain,

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner(_) => ErrorKind::Unauthorized,
            Self::EmptyDomain => ErrorKind::InvalidParameter,
            Self::Snapshot(_) => ErrorKind::Storage,
        }
    }
}
