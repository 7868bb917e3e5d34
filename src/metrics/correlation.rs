use candle_core::Tensor;

use super::error::MetricError;

/// Pearson correlation between gold and predicted scores over one batch.
///
/// Uses population statistics: `mean((t - t̄)(p - p̄)) / (std(t) * std(p))`.
/// Returns `NaN` when either side has zero variance or the batch is empty.
pub fn pearson(y_true: &[f32], y_pred: &[f32]) -> Result<f32, MetricError> {
    if y_true.len() != y_pred.len() {
        return Err(MetricError::LengthMismatch {
            truth: y_true.len(),
            predicted: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Ok(f32::NAN);
    }

    let n = y_true.len() as f64;
    let mean_true = y_true.iter().map(|&v| v as f64).sum::<f64>() / n;
    let mean_pred = y_pred.iter().map(|&v| v as f64).sum::<f64>() / n;

    let mut covariance = 0.0f64;
    let mut var_true = 0.0f64;
    let mut var_pred = 0.0f64;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        let dt = t as f64 - mean_true;
        let dp = p as f64 - mean_pred;
        covariance += dt * dp;
        var_true += dt * dt;
        var_pred += dp * dp;
    }

    if var_true == 0.0 || var_pred == 0.0 {
        return Ok(f32::NAN);
    }

    let r = (covariance / n) / ((var_true / n).sqrt() * (var_pred / n).sqrt());
    Ok(r.clamp(-1.0, 1.0) as f32)
}

/// `-pearson(y_true, y_pred)`.
pub fn negative_pearson(y_true: &[f32], y_pred: &[f32]) -> Result<f32, MetricError> {
    pearson(y_true, y_pred).map(|r| -r)
}

/// Differentiable Pearson correlation over a batch of tensors of any (equal) element count.
///
/// Returns a scalar tensor. Zero variance on either side divides `0 / 0` and yields `NaN`.
pub fn pearson_tensor(y_true: &Tensor, y_pred: &Tensor) -> candle_core::Result<Tensor> {
    let y_true = y_true.flatten_all()?;
    let y_pred = y_pred.flatten_all()?;

    let centered_true = y_true.broadcast_sub(&y_true.mean_all()?)?;
    let centered_pred = y_pred.broadcast_sub(&y_pred.mean_all()?)?;

    let covariance = (&centered_true * &centered_pred)?.mean_all()?;
    let std_true = centered_true.sqr()?.mean_all()?.sqrt()?;
    let std_pred = centered_pred.sqr()?.mean_all()?.sqrt()?;

    covariance.div(&(std_true * std_pred)?)
}

/// `-pearson_tensor(y_true, y_pred)`. Selected as the training objective by
/// `LossKind::NegativePearson`.
pub fn negative_pearson_tensor(y_true: &Tensor, y_pred: &Tensor) -> candle_core::Result<Tensor> {
    pearson_tensor(y_true, y_pred)?.neg()
}
