use candle_core::{D, Module, Result, Tensor};
use candle_nn::{Linear, VarBuilder, linear, ops::softmax};

/// Per-hidden-unit attention over time steps.
///
/// For a `(batch, T, H)` sequence, each hidden unit's length-`T` trajectory is projected
/// by a learned `T × T` map and softmax-normalized across time; the input is then
/// rescaled elementwise by those weights. Output shape equals input shape.
#[derive(Debug, Clone)]
pub struct AttentionBlock {
    projection: Linear,
    time_steps: usize,
}

impl AttentionBlock {
    pub fn new(time_steps: usize, vb: VarBuilder) -> Result<Self> {
        let projection = linear(time_steps, time_steps, vb)?;
        Ok(Self {
            projection,
            time_steps,
        })
    }

    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Attention weights for `xs`, shaped `(batch, T, H)`. Each `[b, .., h]` column sums to 1.
    pub fn weights(&self, xs: &Tensor) -> Result<Tensor> {
        let (_batch, steps, _hidden) = xs.dims3()?;
        if steps != self.time_steps {
            candle_core::bail!(
                "attention expects {} time steps, got {steps}",
                self.time_steps
            );
        }

        // (b, T, H) -> (b, H, T): project and normalize along time
        let per_unit = xs.transpose(1, 2)?.contiguous()?;
        let scores = self.projection.forward(&per_unit)?;
        let probs = softmax(&scores, D::Minus1)?;
        probs.transpose(1, 2)?.contiguous()
    }
}

impl Module for AttentionBlock {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let weights = self.weights(xs)?;
        xs.mul(&weights)
    }
}
