use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding file not found at path: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read embedding file: {reason}")]
    ReadFailed { reason: String },

    #[error("malformed embedding entry on line {line}: {reason}")]
    MalformedEntry { line: usize, reason: String },

    #[error("vector for '{token}' has {actual} components, expected {expected}")]
    DimensionMismatch {
        token: String,
        expected: usize,
        actual: usize,
    },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("invalid embedding configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::ReadFailed {
            reason: err.to_string(),
        }
    }
}
