use std::sync::Arc;

use tracing::{debug, trace};

use crate::dataset::AnswerTable;
use crate::embedding::EmbeddingTable;

use super::error::TextError;
use super::tokenizer::Tokenizer;

/// Word vectors for one input string, in token order.
pub type VectorSequence = Vec<Vec<f32>>;

/// Vectorized form of one data split: four aligned input roles plus labels.
#[derive(Debug, Clone, Default)]
pub struct VectorizedSplit {
    /// Student answers (anchor branch).
    pub answers: Vec<VectorSequence>,
    /// Primary reference answers.
    pub references: Vec<VectorSequence>,
    /// First auxiliary reference.
    pub aux_first: Vec<VectorSequence>,
    /// Second auxiliary reference.
    pub aux_second: Vec<VectorSequence>,
    /// Binary gold labels, untouched.
    pub labels: Vec<f32>,
}

impl VectorizedSplit {
    /// Number of rows (every column has this many).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The four input roles in branch order.
    pub fn roles(&self) -> [&[VectorSequence]; 4] {
        [
            &self.answers,
            &self.references,
            &self.aux_first,
            &self.aux_second,
        ]
    }
}

/// Longest vector sequence across all four roles of a split.
///
/// This is the value that freezes the padded length `L` for a whole run; it is computed
/// from the training split only.
pub fn max_sequence_len(split: &VectorizedSplit) -> usize {
    split
        .roles()
        .iter()
        .flat_map(|role| role.iter().map(Vec::len))
        .max()
        .unwrap_or(0)
}

/// Maps text to sequences of word vectors through a shared, read-only embedding table.
#[derive(Debug, Clone)]
pub struct Vectorizer {
    table: Arc<EmbeddingTable>,
    tokenizer: Tokenizer,
}

impl Vectorizer {
    pub fn new(table: Arc<EmbeddingTable>, tokenizer: Tokenizer) -> Self {
        Self { table, tokenizer }
    }

    /// Width of the produced vectors.
    pub fn dim(&self) -> usize {
        self.table.dim()
    }

    pub fn table(&self) -> &EmbeddingTable {
        &self.table
    }

    /// Vectorizes one string.
    ///
    /// With `token_limit = Some(n)` and `n > 0` only the first `n` tokens are considered
    /// (before any filtering). Punctuation-only tokens and tokens missing from the table
    /// are dropped, so the result can be shorter than the token count, or empty.
    pub fn vectorize_sentence(
        &self,
        text: &str,
        token_limit: Option<usize>,
    ) -> Result<VectorSequence, TextError> {
        let mut tokens = self.tokenizer.tokenize(text)?;

        if let Some(limit) = token_limit
            && limit > 0
        {
            tokens.truncate(limit);
        }

        let mut vectors = Vec::with_capacity(tokens.len());
        for token in &tokens {
            if is_punctuation(token) {
                continue;
            }
            let normalized = normalize(token);
            if normalized.is_empty() {
                continue;
            }
            match self.table.get(&normalized) {
                Some(vector) => vectors.push(vector.to_vec()),
                None => trace!(token = %normalized, "Out-of-vocabulary token skipped"),
            }
        }

        Ok(vectors)
    }

    /// Vectorizes the four text columns of a split row by row, keeping row order.
    pub fn vectorize_table(
        &self,
        table: &AnswerTable,
        token_limit: Option<usize>,
    ) -> Result<VectorizedSplit, TextError> {
        let mut split = VectorizedSplit {
            answers: Vec::with_capacity(table.len()),
            references: Vec::with_capacity(table.len()),
            aux_first: Vec::with_capacity(table.len()),
            aux_second: Vec::with_capacity(table.len()),
            labels: Vec::with_capacity(table.len()),
        };

        for row in table.rows() {
            split
                .answers
                .push(self.vectorize_sentence(&row.student_answer, token_limit)?);
            split
                .references
                .push(self.vectorize_sentence(&row.reference_answer, token_limit)?);
            split
                .aux_first
                .push(self.vectorize_sentence(&row.ref_1, token_limit)?);
            split
                .aux_second
                .push(self.vectorize_sentence(&row.ref_2, token_limit)?);
            split.labels.push(row.label);
        }

        debug!(
            rows = split.len(),
            max_len = max_sequence_len(&split),
            "Vectorized split"
        );

        Ok(split)
    }
}

/// A token made only of ASCII punctuation (`!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~`).
fn is_punctuation(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_punctuation())
}

/// Lowercases and strips every ASCII punctuation character.
fn normalize(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect()
}
