//! Correlation metric and binary evaluation helpers.
//!
//! [`pearson`] is the monitored training metric; [`negative_pearson`] is its loss
//! surrogate. Both also exist over candle tensors so they can sit inside a graph.
//!
//! A batch where either side has zero variance yields `NaN`, never a finite stand-in.

pub mod correlation;
pub mod error;
pub mod evaluation;


pub use correlation::{negative_pearson, negative_pearson_tensor, pearson, pearson_tensor};
pub use error::MetricError;
pub use evaluation::{ConfusionMatrix, accuracy, binarize};
