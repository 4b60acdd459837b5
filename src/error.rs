use std::io;
use thiserror::Error;

/// Custom error type for voltmon
#[derive(Error, Debug)]
pub enum VoltError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Collector error: {0}")]
    Collector(String),
}

/// Result type alias for voltmon
pub type Result<T> = std::result::Result<T, VoltError>;

impl VoltError {
    pub fn collector<S: Into<String>>(msg: S) -> Self {
        VoltError::Collector(msg.into())
    }
}
