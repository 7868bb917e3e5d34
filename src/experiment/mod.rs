//! Per-item experiment runs: read the three splits of an item, train on `train` with
//! `dev` as validation, score `test`, and collect a plain-text report.

pub mod context;
pub mod error;
pub mod report;
pub mod runner;


pub use context::{ExperimentContext, PreparedItem};
pub use error::ExperimentError;
pub use report::{ExperimentReport, ItemResult};
pub use runner::ExperimentRunner;
