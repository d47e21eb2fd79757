use std::fs;

use ferm_core::{LogEntry, LogSink};
use tempfile::tempdir;

fn entry(time: i64, actual: f32, desired: f32, heat: bool) -> LogEntry {
    LogEntry {
        time,
        actual,
        desired,
        heat,
    }
}

#[test]
fn rotation_shifts_generations_up() {
    let dir = tempdir().unwrap();
    let sink = LogSink::new(dir.path());
    for g in 0..3 {
        fs::write(sink.path_for(0, g), format!("gen{g}")).unwrap();
    }

    sink.rotate(0, 3).unwrap();

    assert_eq!(fs::read_to_string(sink.path_for(0, 0)).unwrap(), "");
    assert_eq!(fs::read_to_string(sink.path_for(0, 1)).unwrap(), "gen0");
    assert_eq!(fs::read_to_string(sink.path_for(0, 2)).unwrap(), "gen1");
    assert_eq!(fs::read_to_string(sink.path_for(0, 3)).unwrap(), "gen2");
}

#[test]
fn rotation_discards_generations_past_the_limit() {
    let dir = tempdir().unwrap();
    let sink = LogSink::new(dir.path());
    for g in 0..=2 {
        fs::write(sink.path_for(1, g), format!("gen{g}")).unwrap();
    }

    sink.rotate(1, 2).unwrap();

    assert_eq!(fs::read_to_string(sink.path_for(1, 1)).unwrap(), "gen0");
    assert_eq!(fs::read_to_string(sink.path_for(1, 2)).unwrap(), "gen1");
    assert!(!sink.path_for(1, 3).exists());
}

#[test]
fn rotation_with_no_history_creates_empty_generation_zero() {
    let dir = tempdir().unwrap();
    let sink = LogSink::new(dir.path().join("logs"));
    sink.rotate(0, 5).unwrap();
    assert_eq!(fs::metadata(sink.path_for(0, 0)).unwrap().len(), 0);
    assert!(!sink.path_for(0, 1).exists());
}

#[test]
fn header_written_once_and_rows_flushed() {
    let dir = tempdir().unwrap();
    let sink = LogSink::new(dir.path());

    let mut h = sink.open(0).unwrap();
    h.append(&entry(100, 18.5, 19.0, true)).unwrap();
    // Visible before the handle is dropped
    let text = fs::read_to_string(h.path()).unwrap();
    assert_eq!(text, "Time,Actual,Desired,Heat\n100,18.500,19.000,1\n");
    drop(h);

    let mut h = sink.open(0).unwrap();
    h.append(&entry(160, 19.25, 19.0, false)).unwrap();
    drop(h);

    let text = fs::read_to_string(sink.path_for(0, 0)).unwrap();
    assert_eq!(
        text,
        "Time,Actual,Desired,Heat\n100,18.500,19.000,1\n160,19.250,19.000,0\n"
    );
}

#[test]
fn header_written_into_existing_empty_file() {
    let dir = tempdir().unwrap();
    let sink = LogSink::new(dir.path());
    fs::write(sink.path_for(2, 0), "").unwrap();
    drop(sink.open(2).unwrap());
    assert_eq!(
        fs::read_to_string(sink.path_for(2, 0)).unwrap(),
        "Time,Actual,Desired,Heat\n"
    );
}
