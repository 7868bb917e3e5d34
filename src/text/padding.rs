use candle_core::{Device, Tensor};

use super::error::TextError;
use super::vectorizer::VectorSequence;

/// A rectangular `(batch, max_len, dim)` block of word vectors, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedTensor {
    data: Vec<f32>,
    batch: usize,
    max_len: usize,
    dim: usize,
}

impl PaddedTensor {
    /// `(batch, max_len, dim)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.batch, self.max_len, self.dim)
    }

    pub fn batch(&self) -> usize {
        self.batch
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// One example as a flat `max_len * dim` slice.
    pub fn example(&self, index: usize) -> Result<&[f32], TextError> {
        if index >= self.batch {
            return Err(TextError::RowOutOfBounds {
                index,
                batch: self.batch,
            });
        }
        let stride = self.max_len * self.dim;
        Ok(&self.data[index * stride..(index + 1) * stride])
    }

    /// One time step of one example.
    pub fn step(&self, index: usize, step: usize) -> Result<&[f32], TextError> {
        let example = self.example(index)?;
        let start = step * self.dim;
        example
            .get(start..start + self.dim)
            .ok_or(TextError::RowOutOfBounds {
                index: step,
                batch: self.max_len,
            })
    }

    /// Gathers the given examples (in the given order) into a new block.
    pub fn select(&self, indices: &[usize]) -> Result<Self, TextError> {
        let stride = self.max_len * self.dim;
        let mut data = Vec::with_capacity(indices.len() * stride);
        for &index in indices {
            data.extend_from_slice(self.example(index)?);
        }
        Ok(Self {
            data,
            batch: indices.len(),
            max_len: self.max_len,
            dim: self.dim,
        })
    }

    /// Copies the block onto `device` as an `f32` tensor of shape `(batch, max_len, dim)`.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor, TextError> {
        Ok(Tensor::from_slice(
            &self.data,
            (self.batch, self.max_len, self.dim),
            device,
        )?)
    }
}

/// Right-pads or truncates every sequence to exactly `max_len` steps.
///
/// Sequences longer than `max_len` keep their first `max_len` vectors; shorter ones
/// (including empty ones) are extended with zero vectors at the end. Every vector must be
/// `dim` wide.
pub fn pad_sequences(
    sequences: &[VectorSequence],
    max_len: usize,
    dim: usize,
) -> Result<PaddedTensor, TextError> {
    if max_len == 0 {
        return Err(TextError::ZeroLength);
    }

    let stride = max_len * dim;
    let mut data = vec![0.0f32; sequences.len() * stride];

    for (row, sequence) in sequences.iter().enumerate() {
        let base = row * stride;
        for (step, vector) in sequence.iter().take(max_len).enumerate() {
            if vector.len() != dim {
                return Err(TextError::DimensionMismatch {
                    row,
                    step,
                    expected: dim,
                    actual: vector.len(),
                });
            }
            let start = base + step * dim;
            data[start..start + dim].copy_from_slice(vector);
        }
    }

    Ok(PaddedTensor {
        data,
        batch: sequences.len(),
        max_len,
        dim,
    })
}
