//! Short-answer scoring with an attention-weighted siamese LSTM.
//!
//! # Pipeline
//!
//! - [`text`]: tokenize answers, look tokens up in an [`EmbeddingTable`], pad to `L`
//! - [`model`]: shared LSTM encoder + attention over four branches, fused sigmoid heads
//! - [`training`]: cross-entropy fitting with Pearson monitoring and optional early stopping
//! - [`metrics`]: Pearson correlation, thresholding, accuracy, confusion matrix
//! - [`experiment`]: per-item train/dev/test runs and the plain-text report
//!
//! [`config`] reads the `ASAG_*` environment; [`dataset`] parses the answer TSV files.

pub mod config;
pub mod constants;
pub mod dataset;
pub mod embedding;
pub mod experiment;
pub mod metrics;
pub mod model;
pub mod text;
pub mod training;

pub use config::{Config, ConfigError};
pub use constants::{
    DEFAULT_EMBEDDING_DIM, DimValidationError, PREDICTION_THRESHOLD, ShapeConfig,
    validate_embedding_dim,
};
pub use dataset::{AnswerRow, AnswerTable, DatasetError, read_answers};
pub use embedding::{DevicePreference, EmbeddingError, EmbeddingTable, select_device};
pub use experiment::{
    ExperimentContext, ExperimentError, ExperimentReport, ExperimentRunner, ItemResult,
    PreparedItem,
};
pub use metrics::{
    ConfusionMatrix, MetricError, accuracy, binarize, negative_pearson, pearson,
};
pub use model::{AttentionBlock, ModelError, SiameseConfig, SiameseInputs, SiameseModel, Topology};
pub use text::{
    PaddedTensor, TextError, Tokenizer, VectorSequence, VectorizedSplit, Vectorizer,
    pad_sequences,
};
pub use training::{
    EarlyStoppingConfig, FitOutcome, FitReport, LossKind, OptimizerKind, PaddedSplit, Trainer,
    TrainingConfig, TrainingError,
};
