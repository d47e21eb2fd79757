use std::fs;
use std::path::PathBuf;

use ferm_core::{RunRecord, StateStore};
use tempfile::tempdir;

#[test]
fn write_then_consume_round_trip() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path());
    let source = PathBuf::from("/srv/brew/ale.prog");

    store.write(0, 1_700_000_000, &source).unwrap();
    assert_eq!(
        store.read_and_consume(0),
        Some(RunRecord {
            start_time: 1_700_000_000,
            source
        })
    );
    assert_eq!(store.read_and_consume(0), None);
    assert!(!store.path_for(0).exists());
}

#[test]
fn write_overwrites_previous_record() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path());
    store.write(1, 10, &PathBuf::from("/a")).unwrap();
    store.write(1, 20, &PathBuf::from("/b")).unwrap();
    let r = store.read_and_consume(1).unwrap();
    assert_eq!((r.start_time, r.source), (20, PathBuf::from("/b")));
}

#[test]
fn units_are_independent() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path());
    store.write(0, 1, &PathBuf::from("/zero")).unwrap();
    store.write(1, 2, &PathBuf::from("/one")).unwrap();
    store.delete(0);
    assert_eq!(store.read_and_consume(0), None);
    assert_eq!(store.read_and_consume(1).map(|r| r.start_time), Some(2));
}

#[test]
fn corrupt_record_is_discarded() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path());
    fs::write(store.path_for(0), "not-a-time /some/path\n").unwrap();
    assert_eq!(store.read_and_consume(0), None);
    assert!(!store.path_for(0).exists(), "corrupt record must be consumed");
}

#[test]
fn delete_of_absent_record_is_a_noop() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path());
    store.delete(3);
    assert_eq!(store.read_and_consume(3), None);
}

#[test]
fn record_file_is_plain_text() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path().join("nested"));
    store.write(2, 42, &PathBuf::from("/p q")).unwrap();
    let text = fs::read_to_string(store.path_for(2)).unwrap();
    assert_eq!(text, "42 /p q\n");
}
