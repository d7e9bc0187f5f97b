#![allow(clippy::expect_used, clippy::unwrap_used)]

use playbill_core::grammar::{self, ValidationResult};
use playbill_core::store::TranscriptStore;

#[test]
fn write_transcript_creates_numbered_file_with_trailing_newline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TranscriptStore::new(dir.path()).expect("new store");
    store.ensure_dir().expect("ensure dir");

    let path = store
        .write_transcript(1, "matt: hi\nrob: hey\nmatt: bye")
        .expect("write");
    assert_eq!(path, dir.path().join("001.txt"));

    let written = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(written, "matt: hi\nrob: hey\nmatt: bye\n");
}

#[test]
fn write_transcript_does_not_double_a_trailing_newline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TranscriptStore::new(dir.path()).expect("new store");
    store.ensure_dir().expect("ensure dir");

    let path = store.write_transcript(7, "matt: hi\nrob: hey\n").expect("write");
    let written = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(written, "matt: hi\nrob: hey\n");
}

#[test]
fn ensure_dir_creates_nested_output_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("out").join("inputs");
    let store = TranscriptStore::new(&nested).expect("new store");
    store.ensure_dir().expect("ensure dir");
    assert!(nested.is_dir());
}

#[test]
fn written_transcripts_still_satisfy_the_grammar() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TranscriptStore::new(dir.path()).expect("new store");
    store.ensure_dir().expect("ensure dir");

    let raw = "matt: hi\n\nrob: hey";
    let path = store.write_transcript(3, raw).expect("write");
    let written = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(grammar::validate(&written), ValidationResult::Valid);
}
