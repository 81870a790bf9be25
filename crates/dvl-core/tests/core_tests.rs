use dvl_core::{
    capture_timestamp, parse_log, render, CoreError, ShortCommitId, SnapshotRecord, TrackedPath,
};

fn tracked() -> Vec<TrackedPath> {
    vec![
        TrackedPath::new("raw_data", "raw_data.dvc").unwrap(),
        TrackedPath::new("data/clean", "data/clean.dvc").unwrap(),
    ]
}

#[test]
fn test_stage_snapshot_text() {
    let record = SnapshotRecord::new(
        capture_timestamp(),
        ShortCommitId::from_str("a1b2c3d"),
        tracked(),
        "Stage 8 snapshot",
    )
    .unwrap();
    let text = render(&record);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "# Data Version Log");
    assert!(lines.contains(&"- Git commit: a1b2c3d"));
    let raw = lines.iter().position(|l| *l == "  - raw_data  → raw_data.dvc").unwrap();
    let clean = lines.iter().position(|l| *l == "  - data/clean  → data/clean.dvc").unwrap();
    let notes = lines.iter().position(|l| *l == "Notes:").unwrap();
    assert_eq!(clean, raw + 1);
    assert!(notes > clean);
    assert_eq!(lines[notes + 1], "- Stage 8 snapshot");
}

#[test]
fn test_empty_tracked_paths_rejected() {
    let err = SnapshotRecord::new(capture_timestamp(), ShortCommitId::from_str("a1b2c3d"), vec![], "")
        .unwrap_err();
    assert_eq!(err, CoreError::EmptyTrackedPaths);
}

#[test]
fn test_rendered_record_reads_back() {
    let record = SnapshotRecord::new(
        capture_timestamp(),
        ShortCommitId::from_str("0f9e8d7"),
        tracked(),
        "Stage 6 snapshot\ncolumn cap applied",
    )
    .unwrap();
    assert_eq!(parse_log(&render(&record)).unwrap(), vec![record]);
}

#[test]
fn test_short_commit_id_display() {
    let id = ShortCommitId::from_str("a1b2c3d");
    assert_eq!(id.to_string(), "a1b2c3d");
    assert_eq!(id.as_str(), "a1b2c3d");
}
