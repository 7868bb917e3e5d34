use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::metrics::ConfusionMatrix;
use crate::training::{EvalMetrics, FitOutcome, History};

use super::error::ExperimentError;

/// Outcome of training and testing one item.
#[derive(Debug, Clone)]
pub struct ItemResult {
    pub item_id: String,
    pub max_len: usize,
    pub accuracy: f32,
    pub confusion: ConfusionMatrix,
    pub test: EvalMetrics,
    pub outcome: FitOutcome,
    pub history: History,
    /// Continuous test-set probabilities in row order.
    pub predictions: Vec<f32>,
}

impl ItemResult {
    /// `****<id>****`, the accuracy line, then the confusion matrix.
    pub fn render(&self) -> String {
        format!(
            "****{}****\nAccuracy =  {:.2}\n{}\n",
            self.item_id, self.accuracy, self.confusion
        )
    }
}

#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pub started_at: DateTime<Utc>,
    items: Vec<ItemResult>,
}

impl Default for ExperimentReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: ItemResult) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[ItemResult] {
        &self.items
    }

    pub fn render(&self) -> String {
        self.items.iter().map(ItemResult::render).collect()
    }

    /// Writes the rendered report to `path`, replacing any existing file and creating
    /// parent directories.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ExperimentError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| ExperimentError::ReportWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.render()).map_err(io_err)
    }
}
