use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("failed to build tokenizer rules: {reason}")]
    TokenizerInit { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("sequence {row} step {step} has width {actual}, expected {expected}")]
    DimensionMismatch {
        row: usize,
        step: usize,
        expected: usize,
        actual: usize,
    },

    #[error("padded length must be at least 1")]
    ZeroLength,

    #[error("row index {index} out of bounds for batch of {batch}")]
    RowOutOfBounds { index: usize, batch: usize },

    #[error("tensor conversion failed: {reason}")]
    TensorFailed { reason: String },
}

impl From<candle_core::Error> for TextError {
    fn from(err: candle_core::Error) -> Self {
        TextError::TensorFailed {
            reason: err.to_string(),
        }
    }
}
