use super::*;
use std::io::Write;

fn write_tsv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file.flush().expect("flush");
    file
}

#[test]
fn test_derive_label() {
    assert_eq!(derive_label("0"), 0.0);
    assert_eq!(derive_label("0.5"), 1.0);
    assert_eq!(derive_label("1"), 1.0);
    assert_eq!(derive_label("0.0"), 1.0);
    assert_eq!(derive_label(""), 1.0);
}

#[test]
fn test_answer_row_new_derives_label() {
    let row = AnswerRow::new("a", "b", "c", "d", "0");
    assert_eq!(row.label, 0.0);
    assert_eq!(row.accuracy, "0");

    let row = AnswerRow::new("a", "b", "c", "d", "2");
    assert_eq!(row.label, 1.0);
}

#[test]
fn test_read_selects_columns_in_any_order() {
    let file = write_tsv(
        "id\taccuracy\tref_2\tstudentAnswer\tref_1\treferenceAnswer\n\
         1\t0\tr2a\tstudent a\tr1a\treference a\n\
         2\t0.5\tr2b\tstudent b\tr1b\treference b\n",
    );

    let table = read_answers(file.path()).unwrap();
    assert_eq!(table.len(), 2);

    let first = &table.rows()[0];
    assert_eq!(first.student_answer, "student a");
    assert_eq!(first.reference_answer, "reference a");
    assert_eq!(first.ref_1, "r1a");
    assert_eq!(first.ref_2, "r2a");
    assert_eq!(first.label, 0.0);

    assert_eq!(table.labels(), vec![0.0, 1.0]);
}

#[test]
fn test_read_handles_crlf_and_blank_lines() {
    let file = write_tsv(
        "studentAnswer\treferenceAnswer\tref_1\tref_2\taccuracy\r\n\
         \r\n\
         x\ty\t\tz\t0\r\n",
    );

    let table = read_answers(file.path()).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].ref_1, "");
    assert_eq!(table.rows()[0].accuracy, "0");
    assert_eq!(table.rows()[0].label, 0.0);
}

#[test]
fn test_read_missing_column() {
    let file = write_tsv("studentAnswer\treferenceAnswer\tref_1\taccuracy\nx\ty\tz\t1\n");
    let err = read_answers(file.path()).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::MissingColumn {
            column: "ref_2",
            ..
        }
    ));
}

#[test]
fn test_read_malformed_row() {
    let file = write_tsv("studentAnswer\treferenceAnswer\tref_1\tref_2\taccuracy\nx\ty\n");
    let err = read_answers(file.path()).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::MalformedRow {
            line: 2,
            expected: 5,
            actual: 2,
            ..
        }
    ));
}

#[test]
fn test_read_empty_file_has_no_header() {
    let file = write_tsv("");
    assert!(matches!(
        read_answers(file.path()),
        Err(DatasetError::MissingHeader { .. })
    ));
}

#[test]
fn test_read_missing_file() {
    assert!(matches!(
        read_answers("/no/such/item_train.tsv"),
        Err(DatasetError::NotFound { .. })
    ));
}

#[test]
fn test_read_unquotes_fields_with_tabs_and_newlines() {
    let file = write_tsv(
        "studentAnswer\treferenceAnswer\tref_1\tref_2\taccuracy\n\
         \"says \"\"hi\"\"\"\t\"two\tparts\"\t\"line one\nline two\"\tplain \"mid\" quote\t0\n\
         next\tb\tc\td\t1\n",
    );

    let table = read_answers(file.path()).unwrap();
    assert_eq!(table.len(), 2);

    let first = &table.rows()[0];
    assert_eq!(first.student_answer, "says \"hi\"");
    assert_eq!(first.reference_answer, "two\tparts");
    assert_eq!(first.ref_1, "line one\nline two");
    assert_eq!(first.ref_2, "plain \"mid\" quote");
    assert_eq!(first.label, 0.0);

    assert_eq!(table.rows()[1].student_answer, "next");
}

#[test]
fn test_malformed_row_line_counts_quoted_newlines() {
    let file = write_tsv(
        "studentAnswer\treferenceAnswer\tref_1\tref_2\taccuracy\n\
         \"a\nb\"\ty\tz\tw\t1\n\
         short\trow\n",
    );
    assert!(matches!(
        read_answers(file.path()),
        Err(DatasetError::MalformedRow { line: 4, .. })
    ));
}

#[test]
fn test_read_unterminated_quote() {
    let file = write_tsv(
        "studentAnswer\treferenceAnswer\tref_1\tref_2\taccuracy\n\
         x\t\"never closed\ty\tz\t1\n",
    );
    assert!(matches!(
        read_answers(file.path()),
        Err(DatasetError::UnterminatedQuote { line: 2, .. })
    ));
}
