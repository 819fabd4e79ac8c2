// Tests for the session buffer and its save-as-snapshot behavior.

use std::fs;

use dikte::session::SessionBuffer;
use tempfile::TempDir;

#[test]
fn test_append_requires_active_session() {
    let buffer = SessionBuffer::new();

    buffer.append("ignored, no session yet");
    assert!(buffer.is_empty());

    buffer.set_active(true);
    buffer.append("first");
    buffer.set_active(false);
    buffer.append("ignored again");

    assert_eq!(buffer.snapshot(), vec!["first".to_string()]);
}

#[test]
fn test_save_writes_lines_in_arrival_order() {
    let temp = TempDir::new().unwrap();
    let buffer = SessionBuffer::new();

    buffer.set_active(true);
    buffer.append("one");
    buffer.append("two");
    buffer.append("three");

    let path = buffer.save(temp.path()).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "one\ntwo\nthree\n");

    let file_name = path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("session-"));
    assert!(file_name.ends_with(".txt"));
}

#[test]
fn test_save_does_not_clear_the_buffer() {
    // Saving is a snapshot, not a drain: repeated saves accumulate. This is
    // deliberate observed behavior, so assert it explicitly.
    let temp = TempDir::new().unwrap();
    let buffer = SessionBuffer::new();

    buffer.set_active(true);
    buffer.append("kept");
    buffer.save(temp.path()).unwrap();

    assert!(!buffer.is_empty());
    assert_eq!(buffer.len(), 1);

    buffer.append("second");
    assert_eq!(buffer.snapshot(), vec!["kept".to_string(), "second".to_string()]);
}

#[test]
fn test_save_empty_buffer_writes_empty_file() {
    let temp = TempDir::new().unwrap();
    let buffer = SessionBuffer::new();

    let path = buffer.save(temp.path()).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn test_save_into_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let buffer = SessionBuffer::new();

    let missing = temp.path().join("does-not-exist");
    assert!(buffer.save(&missing).is_err());
}
