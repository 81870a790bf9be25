use crate::{
    error::CoreError,
    ids::ShortCommitId,
    record::{SnapshotRecord, TrackedPath, TRACKED_SEPARATOR},
    render::LOG_HEADING,
    time::parse_timestamp,
};

enum State {
    Idle,
    Commit,
    TrackedHeader,
    Tracked,
    NotesHeader,
    Notes,
}

#[derive(Default)]
struct Draft {
    start_line: usize,
    timestamp: Option<chrono::NaiveDateTime>,
    commit_id: Option<ShortCommitId>,
    tracked: Vec<TrackedPath>,
    notes: Vec<String>,
}

impl Draft {
    fn finish(self) -> Result<SnapshotRecord, CoreError> {
        let line = self.start_line;
        let (Some(ts), Some(commit)) = (self.timestamp, self.commit_id) else {
            return Err(CoreError::Parse { line, msg: "incomplete record".into() });
        };
        SnapshotRecord::new(ts, commit, self.tracked, self.notes.join("\n"))
            .map_err(|e| CoreError::Parse { line, msg: e.to_string() })
    }
}

fn err(line: usize, msg: impl Into<String>) -> CoreError {
    CoreError::Parse { line, msg: msg.into() }
}

/// Read every record back out of a data version log.
///
/// Accepts both heading layouts: a heading before each record, or a single
/// heading at the top of the file.
pub fn parse_log(text: &str) -> Result<Vec<SnapshotRecord>, CoreError> {
    let mut records = Vec::new();
    let mut state = State::Idle;
    let mut draft = Draft::default();

    for (idx, raw) in text.lines().enumerate() {
        let n = idx + 1;
        let line = raw.trim_end_matches('\r');
        let blank = line.trim().is_empty();

        state = match state {
            State::Idle => {
                if blank || line.trim_end() == LOG_HEADING {
                    State::Idle
                } else if let Some(v) = line.strip_prefix("- Timestamp: ") {
                    let ts = parse_timestamp(v).ok_or_else(|| err(n, format!("bad timestamp {v:?}")))?;
                    draft = Draft { start_line: n, timestamp: Some(ts), ..Draft::default() };
                    State::Commit
                } else {
                    return Err(err(n, format!("unexpected line {line:?}")));
                }
            }
            State::Commit => {
                let v = line
                    .strip_prefix("- Git commit: ")
                    .ok_or_else(|| err(n, "expected `- Git commit:`"))?;
                draft.commit_id = Some(ShortCommitId::from_str(v.trim()));
                State::TrackedHeader
            }
            State::TrackedHeader => {
                if line.trim_end() != "- Tracked:" {
                    return Err(err(n, "expected `- Tracked:`"));
                }
                State::Tracked
            }
            State::Tracked => {
                if blank {
                    State::NotesHeader
                } else {
                    let entry = line
                        .strip_prefix("  - ")
                        .ok_or_else(|| err(n, format!("bad tracked line {line:?}")))?;
                    let (label, path) = entry
                        .split_once(TRACKED_SEPARATOR)
                        .ok_or_else(|| err(n, format!("missing separator in {line:?}")))?;
                    draft.tracked.push(TrackedPath::new(label, path).map_err(|e| err(n, e.to_string()))?);
                    State::Tracked
                }
            }
            State::NotesHeader => {
                if line.trim_end() != "Notes:" {
                    return Err(err(n, "expected `Notes:`"));
                }
                State::Notes
            }
            State::Notes => {
                if blank {
                    records.push(std::mem::take(&mut draft).finish()?);
                    State::Idle
                } else {
                    let note = line
                        .strip_prefix("- ")
                        .ok_or_else(|| err(n, format!("bad notes line {line:?}")))?;
                    draft.notes.push(note.to_string());
                    State::Notes
                }
            }
        };
    }

    match state {
        State::Idle => {}
        State::Notes => records.push(draft.finish()?),
        _ => return Err(err(draft.start_line, "truncated record at end of log")),
    }
    Ok(records)
}
