use super::config::EarlyStoppingConfig;

/// Patience counter over a maximized metric.
///
/// `NaN` never counts as an improvement.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    config: EarlyStoppingConfig,
    best: Option<f32>,
    best_epoch: usize,
    wait: usize,
}

impl EarlyStopping {
    pub fn new(config: EarlyStoppingConfig) -> Self {
        Self {
            config,
            best: None,
            best_epoch: 0,
            wait: 0,
        }
    }

    /// Records `value` for `epoch` and returns `true` when training should stop.
    pub fn update(&mut self, epoch: usize, value: f32) -> bool {
        let improved = !value.is_nan()
            && self
                .best
                .is_none_or(|best| value > best + self.config.min_delta);

        if improved {
            self.best = Some(value);
            self.best_epoch = epoch;
            self.wait = 0;
            return false;
        }

        self.wait += 1;
        self.wait >= self.config.patience
    }

    pub fn best(&self) -> Option<f32> {
        self.best
    }

    /// Epoch of the best value, `0` before any improvement.
    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    /// Consecutive epochs without improvement.
    pub fn wait(&self) -> usize {
        self.wait
    }
}
