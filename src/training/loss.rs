use candle_core::{Result, Tensor};

use crate::constants::EPSILON;
use crate::metrics::negative_pearson_tensor;
use crate::model::SiameseModel;

use super::config::LossKind;
use super::error::TrainingError;

/// Mean binary cross-entropy with probabilities clipped to `[ε, 1 - ε]`.
///
/// Both tensors are flattened, so `(batch, 1)` predictions pair with `(batch,)` or
/// `(batch, 1)` labels.
pub fn binary_cross_entropy(probs: &Tensor, labels: &Tensor) -> Result<Tensor> {
    let p = probs.flatten_all()?.clamp(EPSILON, 1.0 - EPSILON)?;
    let y = labels.flatten_all()?.to_dtype(p.dtype())?;

    let positive = y.mul(&p.log()?)?;
    let negative = y.affine(-1.0, 1.0)?.mul(&p.affine(-1.0, 1.0)?.log()?)?;
    positive.add(&negative)?.mean_all()?.neg()
}

/// The selected objective plus the model's L2 penalty on its encoder input kernel.
///
/// With [`LossKind::NegativePearson`] a batch whose labels or predictions are constant
/// gives a `NaN` loss.
pub fn total_loss(
    model: &SiameseModel,
    kind: LossKind,
    probs: &Tensor,
    labels: &Tensor,
) -> std::result::Result<Tensor, TrainingError> {
    let objective = match kind {
        LossKind::BinaryCrossEntropy => binary_cross_entropy(probs, labels)?,
        LossKind::NegativePearson => {
            let labels = labels.to_dtype(probs.dtype())?;
            negative_pearson_tensor(&labels, probs)?
        }
    };
    let penalty = model.regularization()?;
    Ok(objective.add(&penalty)?)
}
