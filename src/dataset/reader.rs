use std::fs;
use std::path::Path;

use tracing::debug;

use crate::constants::NEGATIVE_LABEL_LITERAL;

use super::error::DatasetError;

/// Columns read from every dataset file, in the order they are stored on [`AnswerRow`].
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "studentAnswer",
    "referenceAnswer",
    "ref_1",
    "ref_2",
    "accuracy",
];

/// Binarizes a raw grade: the literal `"0"` is label `0`, anything else is label `1`.
///
/// The comparison is on the raw text, so `"0.0"` or `" 0"` map to `1`.
pub fn derive_label(raw_accuracy: &str) -> f32 {
    if raw_accuracy == NEGATIVE_LABEL_LITERAL {
        0.0
    } else {
        1.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRow {
    pub student_answer: String,
    pub reference_answer: String,
    pub ref_1: String,
    pub ref_2: String,
    /// Raw grade as it appeared in the file.
    pub accuracy: String,
    /// Binary label derived from `accuracy`.
    pub label: f32,
}

impl AnswerRow {
    pub fn new(
        student_answer: impl Into<String>,
        reference_answer: impl Into<String>,
        ref_1: impl Into<String>,
        ref_2: impl Into<String>,
        accuracy: impl Into<String>,
    ) -> Self {
        let accuracy = accuracy.into();
        let label = derive_label(&accuracy);
        Self {
            student_answer: student_answer.into(),
            reference_answer: reference_answer.into(),
            ref_1: ref_1.into(),
            ref_2: ref_2.into(),
            accuracy,
            label,
        }
    }
}

/// Rows of one split in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerTable {
    rows: Vec<AnswerRow>,
}

impl AnswerTable {
    pub fn from_rows(rows: Vec<AnswerRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[AnswerRow] {
        &self.rows
    }

    pub fn labels(&self) -> Vec<f32> {
        self.rows.iter().map(|r| r.label).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads a tab-separated answer file with a header row.
///
/// Only [`REQUIRED_COLUMNS`] are kept; other columns may appear in any order. Empty
/// cells become empty strings. Fields wrapped in double quotes are unquoted and may
/// span tabs and line breaks.
pub fn read_answers<P: AsRef<Path>>(path: P) -> Result<AnswerTable, DatasetError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DatasetError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = split_records(&contents)
        .map_err(|line| DatasetError::UnterminatedQuote {
            path: path.to_path_buf(),
            line,
        })?
        .into_iter()
        .filter(|record| !record.is_blank());

    let header = records.next().ok_or_else(|| DatasetError::MissingHeader {
        path: path.to_path_buf(),
    })?;

    let header: Vec<&str> = header.fields.iter().map(|h| h.trim()).collect();
    let mut positions = [0usize; 5];
    for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = header
            .iter()
            .position(|h| *h == column)
            .ok_or_else(|| DatasetError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })?;
    }
    let needed = positions.iter().max().map_or(0, |m| m + 1);

    let mut rows = Vec::new();
    for record in records {
        if record.fields.len() < needed {
            return Err(DatasetError::MalformedRow {
                path: path.to_path_buf(),
                line: record.line,
                expected: needed,
                actual: record.fields.len(),
            });
        }

        let [student, reference, ref_1, ref_2, accuracy] =
            positions.map(|p| record.fields[p].as_str());
        rows.push(AnswerRow::new(student, reference, ref_1, ref_2, accuracy));
    }

    debug!(path = %path.display(), rows = rows.len(), "Read answer dataset");

    Ok(AnswerTable::from_rows(rows))
}

/// One record and the 1-based line it starts on.
struct Record {
    line: usize,
    fields: Vec<String>,
}

impl Record {
    fn is_blank(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].trim().is_empty()
    }
}

/// Splits tab-separated text into records.
///
/// A field that starts with `"` runs to the next lone `"` and may hold tabs and newlines;
/// `""` inside it is a literal quote. Quotes anywhere else are kept as text. On an
/// unterminated quoted field the error is the line that field starts on.
fn split_records(contents: &str) -> Result<Vec<Record>, usize> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut line = 1;
    let mut record_line = 1;
    let mut at_field_start = true;
    let mut chars = contents.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if at_field_start => {
                let quote_line = line;
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some('"') => break,
                        Some(ch) => {
                            if ch == '\n' {
                                line += 1;
                            }
                            field.push(ch);
                        }
                        None => return Err(quote_line),
                    }
                }
                at_field_start = false;
            }
            '\t' => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\n' => {
                if field.ends_with('\r') {
                    field.pop();
                }
                fields.push(std::mem::take(&mut field));
                records.push(Record {
                    line: record_line,
                    fields: std::mem::take(&mut fields),
                });
                line += 1;
                record_line = line;
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        if field.ends_with('\r') {
            field.pop();
        }
        fields.push(field);
        records.push(Record {
            line: record_line,
            fields,
        });
    }

    Ok(records)
}
