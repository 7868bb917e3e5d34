use thiserror::Error;

use crate::metrics::MetricError;
use crate::model::ModelError;
use crate::text::TextError;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("invalid training configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("{split} split is empty")]
    EmptySplit { split: &'static str },

    #[error("inconsistent split: {reason}")]
    InconsistentSplit { reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Text(#[from] TextError),

    #[error(transparent)]
    Metric(#[from] MetricError),

    #[error("training computation failed: {reason}")]
    Computation { reason: String },
}

impl From<candle_core::Error> for TrainingError {
    fn from(err: candle_core::Error) -> Self {
        TrainingError::Computation {
            reason: err.to_string(),
        }
    }
}
