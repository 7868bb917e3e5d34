use tracing::{info, warn};

use crate::config::Config;
use crate::constants::validate_embedding_dim;
use crate::metrics::{ConfusionMatrix, accuracy, binarize};
use crate::model::{SiameseConfig, SiameseModel};
use crate::training::Trainer;

use super::context::{ExperimentContext, PreparedItem};
use super::error::ExperimentError;
use super::report::{ExperimentReport, ItemResult};

/// Runs items one after another against a shared [`ExperimentContext`].
///
/// Each item gets its own padded length, model and optimizer; nothing carries over
/// between items except the embedding table.
#[derive(Debug)]
pub struct ExperimentRunner {
    context: ExperimentContext,
    config: Config,
}

impl ExperimentRunner {
    pub fn new(context: ExperimentContext, config: Config) -> Self {
        Self { context, config }
    }

    pub fn context(&self) -> &ExperimentContext {
        &self.context
    }

    /// Reads `{data_dir}/{item_id}_{train,dev,test}.tsv` and pads them.
    pub fn prepare_item(&self, item_id: &str) -> Result<PreparedItem, ExperimentError> {
        self.context.prepare(
            item_id,
            &self.config.split_path(item_id, "train"),
            &self.config.split_path(item_id, "dev"),
            &self.config.split_path(item_id, "test"),
        )
    }

    pub fn run_item(&self, item_id: &str) -> Result<ItemResult, ExperimentError> {
        info!(item_id, "Starting item");
        let prepared = self.prepare_item(item_id)?;
        self.run_prepared(prepared)
    }

    /// Trains a fresh model on `prepared.train` (with `dev` as validation) and scores
    /// `test`, thresholding predictions at 0.5.
    pub fn run_prepared(&self, prepared: PreparedItem) -> Result<ItemResult, ExperimentError> {
        validate_embedding_dim(self.context.embedding_dim(), self.config.embedding_dim)?;
        let model_config = SiameseConfig::new(prepared.max_len, self.context.embedding_dim());
        let model = SiameseModel::new(model_config, self.context.device())?;
        let mut trainer = Trainer::new(model, self.config.training.clone())?;

        let validation = if prepared.dev.is_empty() {
            warn!(item_id = %prepared.item_id, "Dev split is empty; training without validation");
            None
        } else {
            Some(&prepared.dev)
        };
        let fit = trainer.fit(&prepared.train, validation)?;

        let test = trainer.evaluate(&prepared.test)?;
        let predictions = trainer.predict(&prepared.test)?;
        let predicted = binarize(&predictions);
        let gold = prepared.test.labels();
        let item_accuracy = accuracy(gold, &predicted)?;
        let confusion = ConfusionMatrix::from_labels(gold, &predicted)?;

        if let Some(dir) = &self.config.model_dir {
            trainer.model().save(dir.join(&prepared.item_id))?;
        }

        info!(
            item_id = %prepared.item_id,
            accuracy = item_accuracy,
            test_loss = test.loss,
            test_pearson = test.pearson,
            epochs = fit.history.len(),
            "Item complete"
        );

        Ok(ItemResult {
            item_id: prepared.item_id,
            max_len: prepared.max_len,
            accuracy: item_accuracy,
            confusion,
            test,
            outcome: fit.outcome,
            history: fit.history,
            predictions,
        })
    }

    /// Runs every configured item in order and writes the report to `result_path`.
    ///
    /// Stops at the first failing item; nothing is written in that case.
    pub fn run_all(&self) -> Result<ExperimentReport, ExperimentError> {
        let mut report = ExperimentReport::new();
        info!(
            items = self.config.item_ids.len(),
            started_at = %report.started_at.to_rfc3339(),
            "Starting experiment"
        );

        for item_id in &self.config.item_ids {
            report.push(self.run_item(item_id)?);
        }

        report.write_to(&self.config.result_path)?;
        info!(
            path = %self.config.result_path.display(),
            items = report.items().len(),
            "Report written"
        );
        Ok(report)
    }
}
