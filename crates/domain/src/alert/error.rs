use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("store write failed: {0}")]
    StoreFailed(String),

    #[error("store read failed: {0}")]
    LoadFailed(String),

    #[error("log append failed: {0}")]
    LogFailed(String),
}
