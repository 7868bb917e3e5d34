use candle_core::{Device, Tensor};

use crate::model::SiameseInputs;
use crate::text::{PaddedTensor, VectorizedSplit, pad_sequences};

use super::error::TrainingError;

/// One data split padded to a fixed length: four aligned input blocks plus labels.
#[derive(Debug, Clone)]
pub struct PaddedSplit {
    answers: PaddedTensor,
    references: PaddedTensor,
    aux_first: PaddedTensor,
    aux_second: PaddedTensor,
    labels: Vec<f32>,
}

/// Tensors for one mini-batch, on the training device.
#[derive(Debug, Clone)]
pub struct Batch {
    pub answer: Tensor,
    pub reference: Tensor,
    pub aux_first: Tensor,
    pub aux_second: Tensor,
    /// `(batch, 1)`.
    pub labels: Tensor,
    pub label_values: Vec<f32>,
}

impl Batch {
    pub fn inputs(&self) -> SiameseInputs<'_> {
        SiameseInputs::new(
            &self.answer,
            &self.reference,
            &self.aux_first,
            &self.aux_second,
        )
    }

    pub fn len(&self) -> usize {
        self.label_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.label_values.is_empty()
    }
}

impl PaddedSplit {
    /// Every block must share one `(batch, max_len, dim)` shape and `labels` must have
    /// `batch` entries.
    pub fn new(
        answers: PaddedTensor,
        references: PaddedTensor,
        aux_first: PaddedTensor,
        aux_second: PaddedTensor,
        labels: Vec<f32>,
    ) -> Result<Self, TrainingError> {
        let shape = answers.shape();
        for (role, block) in [
            ("references", &references),
            ("aux_first", &aux_first),
            ("aux_second", &aux_second),
        ] {
            if block.shape() != shape {
                return Err(TrainingError::InconsistentSplit {
                    reason: format!(
                        "{role} has shape {:?}, answers have {shape:?}",
                        block.shape()
                    ),
                });
            }
        }
        if labels.len() != shape.0 {
            return Err(TrainingError::InconsistentSplit {
                reason: format!("{} labels for {} rows", labels.len(), shape.0),
            });
        }

        Ok(Self {
            answers,
            references,
            aux_first,
            aux_second,
            labels,
        })
    }

    /// Pads every role of a vectorized split to `max_len`.
    pub fn from_vectorized(
        split: &VectorizedSplit,
        max_len: usize,
        dim: usize,
    ) -> Result<Self, TrainingError> {
        Self::new(
            pad_sequences(&split.answers, max_len, dim)?,
            pad_sequences(&split.references, max_len, dim)?,
            pad_sequences(&split.aux_first, max_len, dim)?,
            pad_sequences(&split.aux_second, max_len, dim)?,
            split.labels.clone(),
        )
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.answers.max_len()
    }

    pub fn dim(&self) -> usize {
        self.answers.dim()
    }

    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    /// Gathers rows `indices` (in that order) into device tensors.
    pub fn batch(&self, indices: &[usize], device: &Device) -> Result<Batch, TrainingError> {
        let mut label_values = Vec::with_capacity(indices.len());
        for &index in indices {
            let label = self.labels.get(index).copied().ok_or_else(|| {
                TrainingError::InconsistentSplit {
                    reason: format!("row {index} out of bounds for {} rows", self.len()),
                }
            })?;
            label_values.push(label);
        }

        Ok(Batch {
            answer: self.answers.select(indices)?.to_tensor(device)?,
            reference: self.references.select(indices)?.to_tensor(device)?,
            aux_first: self.aux_first.select(indices)?.to_tensor(device)?,
            aux_second: self.aux_second.select(indices)?.to_tensor(device)?,
            labels: Tensor::from_slice(&label_values, (indices.len(), 1), device)?,
            label_values,
        })
    }
}
