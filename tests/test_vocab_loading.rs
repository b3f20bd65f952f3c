//! Vocabulary/merge-table file loading, including failure modes that only
//! show up when reading from disk.

use bytebpe::{Error, MergeTable, VocabStore};
use std::io::Write;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_vocabulary_from_a_file() {
    let file = write_temp(r#"{"a": 0, "b": 1}"#);
    let vocab = VocabStore::from_json_file(file.path()).unwrap();
    assert_eq!(vocab.len(), 2);
}

#[test]
fn missing_vocabulary_file_is_an_io_error() {
    let err = VocabStore::from_json_file("/nonexistent/path/vocab.json").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn malformed_vocabulary_json_is_a_json_error() {
    let file = write_temp("not json");
    let err = VocabStore::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn loads_merge_table_from_a_file() {
    let file = write_temp("#version: 0.2\na b\nb c\n");
    let merges = MergeTable::from_file(file.path()).unwrap();
    assert_eq!(merges.rank("a", "b"), Some(1));
    assert_eq!(merges.rank("b", "c"), Some(2));
}

#[test]
fn missing_merges_file_is_an_io_error() {
    let err = MergeTable::from_file("/nonexistent/path/merges.txt").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
