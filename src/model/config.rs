use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_L2_PENALTY, ShapeConfig};

use super::error::ModelError;

/// Construction-time hyperparameters of [`SiameseModel`](super::SiameseModel).
///
/// `max_len` must be frozen before construction: the attention projection is
/// `max_len × max_len`, so a model only accepts inputs padded to exactly this length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiameseConfig {
    /// Padded sequence length `L` (time steps).
    pub max_len: usize,
    /// Word-vector width `D`.
    pub embedding_dim: usize,
    /// Hidden units of the shared LSTM. Defaults to `max_len`.
    pub hidden_size: usize,
    /// L2 factor on the encoder's input kernel; `0.0` disables the penalty.
    pub l2_penalty: f64,
}

impl SiameseConfig {
    pub fn new(max_len: usize, embedding_dim: usize) -> Self {
        Self {
            max_len,
            embedding_dim,
            hidden_size: max_len,
            l2_penalty: DEFAULT_L2_PENALTY,
        }
    }

    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    pub fn with_l2_penalty(mut self, l2_penalty: f64) -> Self {
        self.l2_penalty = l2_penalty;
        self
    }

    pub fn shape(&self) -> ShapeConfig {
        ShapeConfig::new(self.max_len, self.embedding_dim)
    }

    /// Width of one flattened, attended branch (`max_len * hidden_size`).
    pub fn flattened_len(&self) -> usize {
        self.max_len * self.hidden_size
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.shape()
            .validate()
            .map_err(|e| ModelError::InvalidConfig {
                reason: e.to_string(),
            })?;

        if self.hidden_size == 0 {
            return Err(ModelError::InvalidConfig {
                reason: "hidden_size cannot be zero".to_string(),
            });
        }

        if !self.l2_penalty.is_finite() || self.l2_penalty < 0.0 {
            return Err(ModelError::InvalidConfig {
                reason: format!(
                    "l2_penalty must be finite and non-negative, got {}",
                    self.l2_penalty
                ),
            });
        }

        Ok(())
    }
}
