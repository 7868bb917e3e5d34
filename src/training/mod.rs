//! Fitting, evaluating and predicting with a [`SiameseModel`](crate::model::SiameseModel).

pub mod config;
pub mod early_stopping;
pub mod error;
pub mod history;
pub mod loss;
pub mod optimizer;
pub mod split;
pub mod trainer;


pub use config::{EarlyStoppingConfig, LossKind, OptimizerKind, TrainingConfig};
pub use early_stopping::EarlyStopping;
pub use error::TrainingError;
pub use history::{EpochMetrics, EvalMetrics, History};
pub use loss::{binary_cross_entropy, total_loss};
pub use optimizer::{Adadelta, ModelOptimizer, ParamsAdadelta};
pub use split::{Batch, PaddedSplit};
pub use trainer::{FitOutcome, FitReport, Trainer};
