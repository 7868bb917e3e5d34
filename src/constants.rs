//! Cross-cutting, shared constants.
//!
//! # Shape Invariants
//!
//! Two sizes flow through every stage of the pipeline and must agree everywhere:
//!
//! 1. the embedding dimensionality `D`, fixed by the embedding table
//! 2. the padded sequence length `L`, frozen once from the training split
//!
//! Use [`ShapeConfig`] to carry both through initialization and
//! [`validate_embedding_dim`] at module boundaries to catch mismatches early.

/// Default word-vector width (300-d GloVe style tables).
pub const DEFAULT_EMBEDDING_DIM: usize = 300;

/// Probability above which a prediction is binarized to label `1` (strict `>`).
pub const PREDICTION_THRESHOLD: f32 = 0.5;

/// Raw `accuracy` value that maps to label `0`; anything else maps to `1`.
pub const NEGATIVE_LABEL_LITERAL: &str = "0";

pub const DEFAULT_EPOCHS: usize = 50;
pub const DEFAULT_BATCH_SIZE: usize = 16;
pub const DEFAULT_EVAL_BATCH_SIZE: usize = 128;
pub const DEFAULT_PREDICT_BATCH_SIZE: usize = 32;
pub const DEFAULT_PATIENCE: usize = 20;
pub const DEFAULT_SEED: u64 = 42;

/// Factor of the L2 penalty applied to the shared encoder's input kernel.
pub const DEFAULT_L2_PENALTY: f64 = 0.01;

/// Clipping epsilon used by the cross-entropy loss and the Adadelta optimizer.
pub const EPSILON: f64 = 1e-7;

/// Runtime shape configuration shared by the padder and the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeConfig {
    /// Padded sequence length `L`.
    pub max_len: usize,
    /// Word-vector width `D`.
    pub embedding_dim: usize,
}

impl ShapeConfig {
    pub fn new(max_len: usize, embedding_dim: usize) -> Self {
        Self {
            max_len,
            embedding_dim,
        }
    }

    /// Rejects zero-sized axes, which cannot feed the recurrent encoder.
    pub fn validate(&self) -> Result<(), DimValidationError> {
        if self.embedding_dim == 0 {
            return Err(DimValidationError::ZeroDimension);
        }
        if self.max_len == 0 {
            return Err(DimValidationError::ZeroLength);
        }
        Ok(())
    }
}

/// Error returned when shape validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Padded length cannot be zero.
    ZeroLength,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::ZeroLength => write!(f, "padded sequence length cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use asag::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(300, DEFAULT_EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(50, DEFAULT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_config_validate_success() {
        let shape = ShapeConfig::new(12, DEFAULT_EMBEDDING_DIM);
        assert!(shape.validate().is_ok());
    }

    #[test]
    fn test_shape_config_validate_zero_dim() {
        let shape = ShapeConfig::new(12, 0);
        assert_eq!(shape.validate(), Err(DimValidationError::ZeroDimension));
    }

    #[test]
    fn test_shape_config_validate_zero_len() {
        let shape = ShapeConfig::new(0, 300);
        assert_eq!(shape.validate(), Err(DimValidationError::ZeroLength));
    }

    #[test]
    fn test_validate_embedding_dim_mismatch() {
        assert_eq!(
            validate_embedding_dim(50, 300),
            Err(DimValidationError::DimensionMismatch {
                expected: 300,
                actual: 50
            })
        );
    }

    #[test]
    fn test_error_display() {
        let err = DimValidationError::ZeroLength;
        assert_eq!(err.to_string(), "padded sequence length cannot be zero");

        let err = DimValidationError::DimensionMismatch {
            expected: 300,
            actual: 50,
        };
        assert!(err.to_string().contains("300"));
        assert!(err.to_string().contains("50"));
    }
}
