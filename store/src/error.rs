use stakegov_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Storage
    }
}
