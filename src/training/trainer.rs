use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::metrics::pearson;
use crate::model::SiameseModel;

use super::config::TrainingConfig;
use super::early_stopping::EarlyStopping;
use super::error::TrainingError;
use super::history::{EpochMetrics, EvalMetrics, History};
use super::loss::total_loss;
use super::optimizer::ModelOptimizer;
use super::split::{Batch, PaddedSplit};

/// How a call to [`Trainer::fit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    Completed,
    StoppedEarly { epoch: usize },
}

#[derive(Debug, Clone)]
pub struct FitReport {
    pub history: History,
    pub outcome: FitOutcome,
}

/// Owns a model and its optimizer state for one training run.
///
/// Optimizer state is created here and never persisted; a loaded model gets a fresh one.
pub struct Trainer {
    model: SiameseModel,
    config: TrainingConfig,
    optimizer: ModelOptimizer,
    rng: StdRng,
}

impl Trainer {
    pub fn new(model: SiameseModel, config: TrainingConfig) -> Result<Self, TrainingError> {
        config.validate()?;
        let optimizer =
            ModelOptimizer::new(config.optimizer, config.learning_rate, model.trainable_vars())?;
        let rng = StdRng::seed_from_u64(config.seed);

        debug!(
            optimizer = %config.optimizer,
            learning_rate = config.learning_rate,
            batch_size = config.batch_size,
            "Trainer created"
        );

        Ok(Self {
            model,
            config,
            optimizer,
            rng,
        })
    }

    pub fn model(&self) -> &SiameseModel {
        &self.model
    }

    pub fn into_model(self) -> SiameseModel {
        self.model
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Trains for `epochs`, optionally stopping early on validation Pearson.
    ///
    /// Early stopping needs a validation split; without one it is ignored with a warning.
    pub fn fit(
        &mut self,
        train: &PaddedSplit,
        validation: Option<&PaddedSplit>,
    ) -> Result<FitReport, TrainingError> {
        if train.is_empty() {
            return Err(TrainingError::EmptySplit { split: "training" });
        }

        let mut stopper = match (self.config.early_stopping, validation) {
            (Some(config), Some(_)) => Some(EarlyStopping::new(config)),
            (Some(_), None) => {
                warn!("Early stopping configured without a validation split; ignoring");
                None
            }
            (None, _) => None,
        };

        info!(
            rows = train.len(),
            validation_rows = validation.map(PaddedSplit::len),
            epochs = self.config.epochs,
            "Starting training"
        );

        let mut history = History::default();
        let mut outcome = FitOutcome::Completed;

        for epoch in 1..=self.config.epochs {
            let train_metrics = self.train_epoch(train)?;
            let validation_metrics = validation.map(|split| self.evaluate(split)).transpose()?;

            info!(
                epoch,
                loss = train_metrics.loss,
                pearson = train_metrics.pearson,
                val_loss = validation_metrics.map(|m| m.loss),
                val_pearson = validation_metrics.map(|m| m.pearson),
                "Epoch complete"
            );

            history.push(EpochMetrics {
                epoch,
                train: train_metrics,
                validation: validation_metrics,
            });

            if let (Some(stopper), Some(metrics)) = (stopper.as_mut(), validation_metrics)
                && stopper.update(epoch, metrics.pearson)
            {
                info!(
                    epoch,
                    best_epoch = stopper.best_epoch(),
                    best_val_pearson = stopper.best(),
                    "Early stopping"
                );
                outcome = FitOutcome::StoppedEarly { epoch };
                break;
            }
        }

        Ok(FitReport { history, outcome })
    }

    /// One pass over `train` in (optionally shuffled) mini-batches; the last partial batch
    /// is kept.
    pub fn train_epoch(&mut self, train: &PaddedSplit) -> Result<EvalMetrics, TrainingError> {
        if train.is_empty() {
            return Err(TrainingError::EmptySplit { split: "training" });
        }

        let mut order: Vec<usize> = (0..train.len()).collect();
        if self.config.shuffle {
            order.shuffle(&mut self.rng);
        }

        let mut running = RunningMetrics::default();
        for indices in order.chunks(self.config.batch_size) {
            let batch = train.batch(indices, self.model.device())?;
            let probs = self.model.forward(&batch.inputs())?;
            let loss = total_loss(&self.model, self.config.loss, &probs, &batch.labels)?;
            let value = loss.to_scalar::<f32>()?;
            if value.is_finite() {
                self.optimizer.backward_step(&loss)?;
            } else {
                // single-row or constant-label batches under the Pearson objective
                warn!(rows = batch.len(), "Non-finite batch loss; parameters left unchanged");
            }

            running.add(&batch, value, &probs)?;
        }

        Ok(running.finish())
    }

    /// Loss and Pearson over `split`, as sample-weighted means of per-batch values.
    pub fn evaluate(&self, split: &PaddedSplit) -> Result<EvalMetrics, TrainingError> {
        if split.is_empty() {
            return Err(TrainingError::EmptySplit {
                split: "evaluation",
            });
        }

        let indices: Vec<usize> = (0..split.len()).collect();
        let mut running = RunningMetrics::default();
        for chunk in indices.chunks(self.config.eval_batch_size) {
            let batch = split.batch(chunk, self.model.device())?;
            let probs = self.model.forward(&batch.inputs())?;
            let loss = total_loss(&self.model, self.config.loss, &probs, &batch.labels)?;
            running.add(&batch, loss.to_scalar::<f32>()?, &probs)?;
        }

        Ok(running.finish())
    }

    /// Continuous probabilities for every row of `split`, in row order.
    pub fn predict(&self, split: &PaddedSplit) -> Result<Vec<f32>, TrainingError> {
        let indices: Vec<usize> = (0..split.len()).collect();
        let mut predictions = Vec::with_capacity(split.len());
        for chunk in indices.chunks(self.config.predict_batch_size) {
            let batch = split.batch(chunk, self.model.device())?;
            predictions.extend(self.model.predict(&batch.inputs())?);
        }
        Ok(predictions)
    }
}

/// Sample-weighted running means of batch loss and batch Pearson.
///
/// A `NaN` batch correlation makes the epoch correlation `NaN`.
#[derive(Default)]
struct RunningMetrics {
    rows: usize,
    loss_sum: f64,
    pearson_sum: f64,
}

impl RunningMetrics {
    fn add(
        &mut self,
        batch: &Batch,
        loss: f32,
        probs: &candle_core::Tensor,
    ) -> Result<(), TrainingError> {
        let predicted = probs.flatten_all()?.to_vec1::<f32>()?;
        let r = pearson(&batch.label_values, &predicted)?;
        let n = batch.len();

        self.rows += n;
        self.loss_sum += f64::from(loss) * n as f64;
        self.pearson_sum += f64::from(r) * n as f64;
        Ok(())
    }

    fn finish(&self) -> EvalMetrics {
        if self.rows == 0 {
            return EvalMetrics {
                loss: f32::NAN,
                pearson: f32::NAN,
            };
        }
        let n = self.rows as f64;
        EvalMetrics {
            loss: (self.loss_sum / n) as f32,
            pearson: (self.pearson_sum / n) as f32,
        }
    }
}
