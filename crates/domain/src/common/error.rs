use thiserror::Error;

use crate::alert::error::AlertError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("fetch error: {0}")]
    FetchError(String),

    #[error("publish error: {0}")]
    PublishError(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<AlertError> for DomainError {
    fn from(err: AlertError) -> Self {
        Self::StorageError(err.to_string())
    }
}
