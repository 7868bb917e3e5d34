use crate::constants::PREDICTION_THRESHOLD;

use super::error::MetricError;

/// Thresholds continuous probabilities into labels: `p > 0.5` → `1`, else `0`.
pub fn binarize(predictions: &[f32]) -> Vec<u8> {
    predictions
        .iter()
        .map(|&p| u8::from(p > PREDICTION_THRESHOLD))
        .collect()
}

/// Fraction of positions where the gold label (binarized the same way) equals the
/// predicted label. Empty input gives `NaN`.
pub fn accuracy(gold: &[f32], predicted: &[u8]) -> Result<f32, MetricError> {
    if gold.len() != predicted.len() {
        return Err(MetricError::LengthMismatch {
            truth: gold.len(),
            predicted: predicted.len(),
        });
    }
    if gold.is_empty() {
        return Ok(f32::NAN);
    }

    let correct = gold
        .iter()
        .zip(predicted)
        .filter(|&(&g, &p)| u8::from(g > PREDICTION_THRESHOLD) == p)
        .count();
    Ok(correct as f32 / gold.len() as f32)
}

/// 2×2 confusion matrix; rows are gold labels, columns are predicted labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_labels(gold: &[f32], predicted: &[u8]) -> Result<Self, MetricError> {
        if gold.len() != predicted.len() {
            return Err(MetricError::LengthMismatch {
                truth: gold.len(),
                predicted: predicted.len(),
            });
        }

        let mut counts = [[0usize; 2]; 2];
        for (&g, &p) in gold.iter().zip(predicted) {
            let row = usize::from(g > PREDICTION_THRESHOLD);
            let col = usize::from(p > 0);
            counts[row][col] += 1;
        }
        Ok(Self { counts })
    }

    /// Count of examples with gold label `gold` predicted as `predicted`.
    pub fn get(&self, gold: usize, predicted: usize) -> usize {
        self.counts[gold.min(1)][predicted.min(1)]
    }

    pub fn true_negatives(&self) -> usize {
        self.counts[0][0]
    }

    pub fn false_positives(&self) -> usize {
        self.counts[0][1]
    }

    pub fn false_negatives(&self) -> usize {
        self.counts[1][0]
    }

    pub fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

impl std::fmt::Display for ConfusionMatrix {
    /// Renders like a numpy integer array, e.g. `[[3 1]\n [0 4]]`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .counts
            .iter()
            .flatten()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1);
        let [[a, b], [c, d]] = self.counts;
        write!(
            f,
            "[[{a:>width$} {b:>width$}]\n [{c:>width$} {d:>width$}]]"
        )
    }
}
