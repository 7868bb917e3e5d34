//! Answer datasets: tab-separated files with one student answer, three reference
//! answers and a raw `accuracy` grade per row.

pub mod error;
pub mod reader;

#[cfg(test)]
mod tests;

pub use error::DatasetError;
pub use reader::{AnswerRow, AnswerTable, REQUIRED_COLUMNS, derive_label, read_answers};
