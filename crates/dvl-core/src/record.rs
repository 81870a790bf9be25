use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{error::CoreError, ids::ShortCommitId, time::timestamp_serde};

/// Separator between a tracked label and its path in the rendered log.
pub const TRACKED_SEPARATOR: &str = "  → ";

/// A logical dataset name and the file whose versioned state it points at
/// (for example `raw_data` and `raw_data.dvc`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TrackedPathFields")]
pub struct TrackedPath {
    pub label: String,
    pub path: String,
}

#[derive(Deserialize)]
struct TrackedPathFields {
    label: String,
    path: String,
}

impl TryFrom<TrackedPathFields> for TrackedPath {
    type Error = CoreError;

    fn try_from(f: TrackedPathFields) -> Result<Self, Self::Error> {
        TrackedPath::new(f.label, f.path)
    }
}

impl TrackedPath {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Result<Self, CoreError> {
        let label = label.into().trim().to_string();
        let path = path.into().trim().to_string();
        if label.is_empty() || path.is_empty() {
            return Err(CoreError::InvalidTrackedPath(format!(
                "label and path must be non-empty (label={label:?}, path={path:?})"
            )));
        }
        if has_line_break(&label) || has_line_break(&path) {
            return Err(CoreError::InvalidTrackedPath(format!("{label:?} spans several lines")));
        }
        if label.contains(TRACKED_SEPARATOR.trim()) {
            return Err(CoreError::InvalidTrackedPath(format!(
                "label {label:?} contains the separator {:?}",
                TRACKED_SEPARATOR.trim()
            )));
        }
        Ok(Self { label, path })
    }

    /// Parse `label=path`, the form accepted on the command line.
    pub fn parse_pair(s: &str) -> Result<Self, CoreError> {
        let (label, path) = s
            .split_once('=')
            .ok_or_else(|| CoreError::InvalidTrackedPath(format!("expected LABEL=PATH, got {s:?}")))?;
        Self::new(label, path)
    }

    /// Re-check an entry that may have been built from its public fields.
    pub fn validate(&self) -> Result<Self, CoreError> {
        Self::new(self.label.as_str(), self.path.as_str())
    }
}

/// Non-empty, individually valid tracked set.
pub fn validate_tracked_paths(tracked_paths: Vec<TrackedPath>) -> Result<Vec<TrackedPath>, CoreError> {
    if tracked_paths.is_empty() {
        return Err(CoreError::EmptyTrackedPaths);
    }
    tracked_paths.iter().map(TrackedPath::validate).collect()
}

fn has_line_break(s: &str) -> bool {
    s.contains('\n') || s.contains('\r')
}

/// One immutable entry of the data version log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    #[serde(with = "timestamp_serde")]
    pub timestamp: NaiveDateTime,
    pub commit_id: ShortCommitId,
    pub tracked_paths: Vec<TrackedPath>,
    pub notes: String,
}

impl SnapshotRecord {
    /// Builds a record, rejecting an empty tracked set or any invalid entry.
    ///
    /// Notes are normalised to non-blank lines without trailing whitespace, so
    /// the rendered form reads back to the same value.
    pub fn new(
        timestamp: NaiveDateTime,
        commit_id: ShortCommitId,
        tracked_paths: Vec<TrackedPath>,
        notes: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let tracked_paths = validate_tracked_paths(tracked_paths)?;
        if commit_id.as_str().trim().is_empty() {
            return Err(CoreError::EmptyCommitId);
        }
        Ok(Self {
            timestamp,
            commit_id,
            tracked_paths,
            notes: normalize_notes(&notes.into()),
        })
    }
}

pub fn normalize_notes(notes: &str) -> String {
    notes
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap().and_hms_opt(5, 6, 7).unwrap()
    }

    #[test]
    fn tracked_path_trims_and_validates() {
        let t = TrackedPath::new(" raw_data ", "raw_data.dvc ").unwrap();
        assert_eq!(t.label, "raw_data");
        assert_eq!(t.path, "raw_data.dvc");

        assert!(TrackedPath::new("", "x").is_err());
        assert!(TrackedPath::new("a", "   ").is_err());
        assert!(TrackedPath::new("a\nb", "x").is_err());
        assert!(TrackedPath::new("a → b", "x").is_err());
    }

    #[test]
    fn parse_pair_splits_on_first_equals() {
        let t = TrackedPath::parse_pair("features=data/a=b.dvc").unwrap();
        assert_eq!(t.label, "features");
        assert_eq!(t.path, "data/a=b.dvc");
        assert!(TrackedPath::parse_pair("no-separator").is_err());
    }

    #[test]
    fn empty_tracked_paths_rejected() {
        let err = SnapshotRecord::new(ts(), ShortCommitId::from_str("abc1234"), vec![], "n").unwrap_err();
        assert_eq!(err, CoreError::EmptyTrackedPaths);
    }

    #[test]
    fn entries_built_from_fields_are_revalidated() {
        let bad = TrackedPath { label: "raw\ndata".into(), path: "raw_data.dvc".into() };
        let err = SnapshotRecord::new(ts(), ShortCommitId::from_str("abc1234"), vec![bad], "n").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTrackedPath(_)), "{err:?}");

        let arrow = TrackedPath { label: "a → b".into(), path: "x.dvc".into() };
        assert!(validate_tracked_paths(vec![arrow]).is_err());
    }

    #[test]
    fn deserialize_rejects_invalid_entries() {
        let bad: Result<TrackedPath, _> = serde_json::from_str(r#"{"label":"raw\ndata","path":"raw_data.dvc"}"#);
        assert!(bad.is_err());
        let ok: TrackedPath = serde_json::from_str(r#"{"label":" raw_data ","path":"raw_data.dvc"}"#).unwrap();
        assert_eq!(ok.label, "raw_data");
    }

    #[test]
    fn notes_are_normalised() {
        let r = SnapshotRecord::new(
            ts(),
            ShortCommitId::from_str("abc1234"),
            vec![TrackedPath::new("raw_data", "raw_data.dvc").unwrap()],
            "first  \n\n  second\n",
        )
        .unwrap();
        assert_eq!(r.notes, "first\n  second");
    }

    #[test]
    fn serializes_timestamp_in_log_layout() {
        let r = SnapshotRecord::new(
            ts(),
            ShortCommitId::from_str("abc1234"),
            vec![TrackedPath::new("raw_data", "raw_data.dvc").unwrap()],
            "",
        )
        .unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["timestamp"], "2025-03-04 05:06:07");
        assert_eq!(json["commit_id"], "abc1234");
        let back: SnapshotRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
