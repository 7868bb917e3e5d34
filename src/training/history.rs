/// Loss and Pearson correlation over one pass of a split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalMetrics {
    pub loss: f32,
    pub pearson: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMetrics {
    /// 1-based.
    pub epoch: usize,
    pub train: EvalMetrics,
    pub validation: Option<EvalMetrics>,
}

/// Per-epoch metrics in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    epochs: Vec<EpochMetrics>,
}

impl History {
    pub fn push(&mut self, metrics: EpochMetrics) {
        self.epochs.push(metrics);
    }

    pub fn epochs(&self) -> &[EpochMetrics] {
        &self.epochs
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    pub fn train_losses(&self) -> Vec<f32> {
        self.epochs.iter().map(|e| e.train.loss).collect()
    }

    /// Epoch with the highest validation Pearson, ignoring `NaN`.
    pub fn best_validation(&self) -> Option<&EpochMetrics> {
        self.epochs
            .iter()
            .filter(|e| e.validation.is_some_and(|v| !v.pearson.is_nan()))
            .max_by(|a, b| {
                let pa = a.validation.map_or(f32::NEG_INFINITY, |v| v.pearson);
                let pb = b.validation.map_or(f32::NEG_INFINITY, |v| v.pearson);
                pa.total_cmp(&pb)
            })
    }
}
