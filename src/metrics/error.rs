use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MetricError {
    #[error("length mismatch: {truth} gold values vs {predicted} predictions")]
    LengthMismatch { truth: usize, predicted: usize },
}
