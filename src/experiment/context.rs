use std::path::Path;
use std::sync::Arc;

use candle_core::Device;
use tracing::info;

use crate::dataset::read_answers;
use crate::embedding::EmbeddingTable;
use crate::text::{Tokenizer, VectorizedSplit, Vectorizer, max_sequence_len};
use crate::training::PaddedSplit;

use super::error::ExperimentError;

/// Read-only resources shared by every item of a run.
#[derive(Debug, Clone)]
pub struct ExperimentContext {
    vectorizer: Vectorizer,
    device: Device,
    token_limit: Option<usize>,
}

/// The three splits of one item, padded to the length frozen from its training split.
#[derive(Debug, Clone)]
pub struct PreparedItem {
    pub item_id: String,
    pub max_len: usize,
    pub train: PaddedSplit,
    pub dev: PaddedSplit,
    pub test: PaddedSplit,
}

impl ExperimentContext {
    pub fn new(
        table: Arc<EmbeddingTable>,
        device: Device,
        token_limit: Option<usize>,
    ) -> Result<Self, ExperimentError> {
        let vectorizer = Vectorizer::new(table, Tokenizer::new()?);
        Ok(Self {
            vectorizer,
            device,
            token_limit,
        })
    }

    pub fn vectorizer(&self) -> &Vectorizer {
        &self.vectorizer
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn embedding_dim(&self) -> usize {
        self.vectorizer.dim()
    }

    /// Reads and vectorizes one split file.
    pub fn load_split<P: AsRef<Path>>(&self, path: P) -> Result<VectorizedSplit, ExperimentError> {
        let table = read_answers(path)?;
        Ok(self.vectorizer.vectorize_table(&table, self.token_limit)?)
    }

    /// Vectorizes all three splits and pads them to the training split's longest sequence.
    ///
    /// Dev and test sequences longer than that length are truncated.
    pub fn prepare(
        &self,
        item_id: &str,
        train: &Path,
        dev: &Path,
        test: &Path,
    ) -> Result<PreparedItem, ExperimentError> {
        let train = self.load_split(train)?;
        let dev = self.load_split(dev)?;
        let test = self.load_split(test)?;

        let max_len = max_sequence_len(&train);
        if max_len == 0 {
            return Err(ExperimentError::EmptyTrainingVocabulary {
                item_id: item_id.to_string(),
            });
        }

        info!(
            item_id,
            max_len,
            dev_max_len = max_sequence_len(&dev),
            test_max_len = max_sequence_len(&test),
            "Frozen padded length from training split"
        );

        let dim = self.embedding_dim();
        Ok(PreparedItem {
            item_id: item_id.to_string(),
            max_len,
            train: PaddedSplit::from_vectorized(&train, max_len, dim)?,
            dev: PaddedSplit::from_vectorized(&dev, max_len, dim)?,
            test: PaddedSplit::from_vectorized(&test, max_len, dim)?,
        })
    }
}
