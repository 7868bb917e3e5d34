use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_EVAL_BATCH_SIZE, DEFAULT_PATIENCE,
    DEFAULT_PREDICT_BATCH_SIZE, DEFAULT_SEED,
};

use super::error::TrainingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizerKind {
    #[default]
    Adadelta,
    AdamW,
}

impl FromStr for OptimizerKind {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adadelta" => Ok(Self::Adadelta),
            "adamw" => Ok(Self::AdamW),
            other => Err(TrainingError::InvalidConfig {
                reason: format!("unknown optimizer '{other}' (expected adadelta or adamw)"),
            }),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adadelta => f.write_str("adadelta"),
            Self::AdamW => f.write_str("adamw"),
        }
    }
}

/// Objective minimized during training. The encoder's L2 penalty is added to either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LossKind {
    #[default]
    BinaryCrossEntropy,
    /// `-pearson(labels, probs)` over each batch.
    NegativePearson,
}

impl FromStr for LossKind {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bce" | "binary_crossentropy" => Ok(Self::BinaryCrossEntropy),
            "pearson" | "negative_pearson" => Ok(Self::NegativePearson),
            other => Err(TrainingError::InvalidConfig {
                reason: format!("unknown loss '{other}' (expected bce or pearson)"),
            }),
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BinaryCrossEntropy => f.write_str("bce"),
            Self::NegativePearson => f.write_str("pearson"),
        }
    }
}

/// Stop when validation Pearson has not improved for `patience` consecutive epochs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarlyStoppingConfig {
    pub patience: usize,
    /// Minimum increase over the best value that counts as an improvement.
    pub min_delta: f32,
}

impl Default for EarlyStoppingConfig {
    fn default() -> Self {
        Self {
            patience: DEFAULT_PATIENCE,
            min_delta: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub eval_batch_size: usize,
    pub predict_batch_size: usize,
    pub optimizer: OptimizerKind,
    pub learning_rate: f64,
    pub loss: LossKind,
    /// `None` trains for the full `epochs`.
    pub early_stopping: Option<EarlyStoppingConfig>,
    /// Reshuffle the training rows every epoch.
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            eval_batch_size: DEFAULT_EVAL_BATCH_SIZE,
            predict_batch_size: DEFAULT_PREDICT_BATCH_SIZE,
            optimizer: OptimizerKind::default(),
            learning_rate: 1.0,
            loss: LossKind::default(),
            early_stopping: None,
            shuffle: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl TrainingConfig {
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerKind, learning_rate: f64) -> Self {
        self.optimizer = optimizer;
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_loss(mut self, loss: LossKind) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_early_stopping(mut self, early_stopping: EarlyStoppingConfig) -> Self {
        self.early_stopping = Some(early_stopping);
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        let sizes = [
            ("epochs", self.epochs),
            ("batch_size", self.batch_size),
            ("eval_batch_size", self.eval_batch_size),
            ("predict_batch_size", self.predict_batch_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(TrainingError::InvalidConfig {
                reason: format!("{name} must be at least 1"),
            });
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainingError::InvalidConfig {
                reason: format!("learning_rate must be positive, got {}", self.learning_rate),
            });
        }

        if let Some(early) = &self.early_stopping
            && (!early.min_delta.is_finite() || early.min_delta < 0.0)
        {
            return Err(TrainingError::InvalidConfig {
                reason: format!("min_delta must be non-negative, got {}", early.min_delta),
            });
        }

        Ok(())
    }
}
