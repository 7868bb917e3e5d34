use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Immutable mapping from a normalized token to its word vector.
///
/// Every vector has the same width ([`dim`](Self::dim)). Lookups that miss return `None`;
/// callers treat a miss as "skip this token", never as an error.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingTable {
    /// Creates an empty table for vectors of width `dim`.
    pub fn new(dim: usize) -> Result<Self, EmbeddingError> {
        if dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding dimension cannot be zero".to_string(),
            });
        }
        Ok(Self {
            dim,
            vectors: HashMap::new(),
        })
    }

    /// Builds a table from `(token, vector)` pairs, rejecting any vector of the wrong width.
    pub fn from_entries<I, S>(dim: usize, entries: I) -> Result<Self, EmbeddingError>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut table = Self::new(dim)?;
        for (token, vector) in entries {
            table.insert(token, vector)?;
        }
        Ok(table)
    }

    /// Adds a vector. An existing entry for the same token is kept.
    pub fn insert<S: Into<String>>(
        &mut self,
        token: S,
        vector: Vec<f32>,
    ) -> Result<bool, EmbeddingError> {
        let token = token.into();
        if vector.len() != self.dim {
            return Err(EmbeddingError::DimensionMismatch {
                token,
                expected: self.dim,
                actual: vector.len(),
            });
        }
        if self.vectors.contains_key(&token) {
            return Ok(false);
        }
        self.vectors.insert(token, vector);
        Ok(true)
    }

    /// Loads a GloVe-style text file: one `token v1 v2 … vD` entry per line.
    ///
    /// The file is memory-mapped; blank lines are skipped and duplicate tokens keep their
    /// first vector.
    pub fn from_glove_file<P: AsRef<Path>>(path: P, dim: usize) -> Result<Self, EmbeddingError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EmbeddingError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            warn!(path = %path.display(), "Embedding file is empty");
            return Self::new(dim);
        }

        // SAFETY: the map is read-only and dropped before this function returns.
        let mmap = unsafe { Mmap::map(&file)? };
        let text = std::str::from_utf8(&mmap).map_err(|e| EmbeddingError::ReadFailed {
            reason: format!("embedding file is not valid UTF-8: {e}"),
        })?;

        let mut table = Self::new(dim)?;
        let mut duplicates = 0usize;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(token) = fields.next() else {
                continue;
            };

            let vector = fields
                .map(|v| {
                    v.parse::<f32>().map_err(|e| EmbeddingError::MalformedEntry {
                        line: line_no,
                        reason: format!("component '{v}' is not a number: {e}"),
                    })
                })
                .collect::<Result<Vec<f32>, _>>()?;

            if vector.len() != dim {
                return Err(EmbeddingError::MalformedEntry {
                    line: line_no,
                    reason: format!("expected {dim} components, found {}", vector.len()),
                });
            }

            if !table.insert(token, vector)? {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            debug!(duplicates, "Ignored duplicate embedding tokens");
        }

        info!(
            path = %path.display(),
            vocabulary = table.len(),
            dim,
            "Embedding table loaded"
        );

        Ok(table)
    }

    /// Looks up a normalized token.
    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(Vec::as_slice)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.vectors.contains_key(token)
    }

    /// Width of every vector in the table.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Vocabulary size.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
