use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset {path} has no header row")]
    MissingHeader { path: PathBuf },

    #[error("dataset {path} is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("dataset {path} line {line}: quoted field is never closed")]
    UnterminatedQuote { path: PathBuf, line: usize },

    #[error("dataset {path} line {line}: expected at least {expected} fields, found {actual}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        actual: usize,
    },
}
