use std::path::PathBuf;
use thiserror::Error;

use crate::constants::DimValidationError;
use crate::dataset::DatasetError;
use crate::embedding::EmbeddingError;
use crate::metrics::MetricError;
use crate::model::ModelError;
use crate::text::TextError;
use crate::training::TrainingError;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("item '{item_id}': training split has no in-vocabulary tokens")]
    EmptyTrainingVocabulary { item_id: String },

    #[error("failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("embedding table does not match the configured width: {0}")]
    EmbeddingWidth(#[from] DimValidationError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Text(#[from] TextError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Metric(#[from] MetricError),
}
