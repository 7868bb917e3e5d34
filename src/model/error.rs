use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid model configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("shape mismatch at '{node}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        node: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("topology node '{node}' references unknown input '{input}'")]
    UnknownInput { node: String, input: String },

    #[error("stored topology does not match its configuration: {reason}")]
    TopologyMismatch { reason: String },

    #[error("model computation failed: {reason}")]
    Computation { reason: String },

    #[error("model artifact not found: {path}")]
    MissingArtifact { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize topology: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<candle_core::Error> for ModelError {
    fn from(err: candle_core::Error) -> Self {
        ModelError::Computation {
            reason: err.to_string(),
        }
    }
}
