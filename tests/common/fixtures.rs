//! Shared builders for integration tests.

use std::path::Path;
use std::sync::Arc;

use asag::embedding::EmbeddingTable;
use asag::text::{Tokenizer, Vectorizer};

/// Width of the fixture vectors.
pub const FIXTURE_DIM: usize = 4;

pub const TSV_HEADER: &str = "id\tstudentAnswer\treferenceAnswer\tref_1\tref_2\taccuracy";

/// Deterministic pseudo-random vector for `seed`, values in `[-1, 1)`.
pub fn deterministic_vector(seed: u64, dim: usize) -> Vec<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..dim)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
        })
        .collect()
}

pub const VOCABULARY: [&str; 12] = [
    "photosynthesis", "plants", "light", "energy", "water", "sugar", "oxygen", "produce",
    "sun", "use", "convert", "leaves",
];

pub fn fixture_table() -> Arc<EmbeddingTable> {
    let entries = VOCABULARY
        .iter()
        .enumerate()
        .map(|(i, word)| (*word, deterministic_vector(i as u64, FIXTURE_DIM)));
    Arc::new(EmbeddingTable::from_entries(FIXTURE_DIM, entries).expect("fixture table"))
}

pub fn fixture_vectorizer() -> Vectorizer {
    Vectorizer::new(fixture_table(), Tokenizer::new().expect("tokenizer"))
}

/// Writes the same vocabulary as a GloVe text file.
pub fn write_glove(path: &Path) {
    let mut contents = String::new();
    for (i, word) in VOCABULARY.iter().enumerate() {
        let values: Vec<String> = deterministic_vector(i as u64, FIXTURE_DIM)
            .iter()
            .map(|v| v.to_string())
            .collect();
        contents.push_str(&format!("{word} {}\n", values.join(" ")));
    }
    std::fs::write(path, contents).expect("write glove");
}

/// Answer rows: `(student, reference, ref_1, ref_2, accuracy)`.
pub type Row<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str);

pub fn sample_rows() -> Vec<Row<'static>> {
    vec![
        (
            "Plants use light energy to produce sugar.",
            "Plants convert light energy into sugar and oxygen.",
            "Leaves use sun light.",
            "Photosynthesis produces sugar.",
            "1",
        ),
        (
            "Water.",
            "Plants convert light energy into sugar and oxygen.",
            "Leaves use sun light.",
            "Photosynthesis produces sugar.",
            "0",
        ),
        (
            "They produce oxygen from water and light!",
            "Plants convert light energy into sugar and oxygen.",
            "Leaves use sun light.",
            "Photosynthesis produces sugar.",
            "0.5",
        ),
        (
            "I don't know.",
            "Plants convert light energy into sugar and oxygen.",
            "Leaves use sun light.",
            "Photosynthesis produces sugar.",
            "0",
        ),
    ]
}

pub fn write_tsv(path: &Path, rows: &[Row<'_>]) {
    let mut contents = format!("{TSV_HEADER}\n");
    for (i, (a, b, c, d, acc)) in rows.iter().enumerate() {
        contents.push_str(&format!("{i}\t{a}\t{b}\t{c}\t{d}\t{acc}\n"));
    }
    std::fs::write(path, contents).expect("write tsv");
}

/// Writes `{item_id}_{train,dev,test}.tsv` into `dir`.
pub fn write_item(dir: &Path, item_id: &str) {
    let rows = sample_rows();
    write_tsv(&dir.join(format!("{item_id}_train.tsv")), &rows);
    write_tsv(&dir.join(format!("{item_id}_dev.tsv")), &rows[..2]);
    write_tsv(&dir.join(format!("{item_id}_test.tsv")), &rows[1..]);
}
