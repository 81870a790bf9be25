use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use dvl_core::{parse_log, render, render_entry, CoreError, SnapshotRecord, LOG_HEADING};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Where the `# Data Version Log` heading goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingMode {
    /// Heading repeated in front of every appended record.
    #[default]
    EveryAppend,
    /// Heading written once, when the log is absent or empty.
    Once,
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("write {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("{}: {source}", path.display())]
    Parse { path: PathBuf, source: CoreError },
}

pub trait LogStore: Send + Sync {
    /// Append raw text to the log at `path`.
    fn append(&self, path: &Path, text: &str) -> Result<(), LogError>;

    /// Text that `append_record` would write for `record` at `path`.
    fn text_for(&self, path: &Path, record: &SnapshotRecord) -> String;

    fn append_record(&self, path: &Path, record: &SnapshotRecord) -> Result<String, LogError> {
        let text = self.text_for(path, record);
        self.append(path, &text)?;
        Ok(text)
    }

    fn read_records(&self, path: &Path) -> Result<Vec<SnapshotRecord>, LogError>;
}

#[derive(Clone, Debug, Default)]
pub struct FsLogStore {
    pub heading: HeadingMode,
}

impl FsLogStore {
    pub fn new(heading: HeadingMode) -> Self {
        Self { heading }
    }

    fn is_empty_or_missing(path: &Path) -> bool {
        std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true)
    }

    /// Newlines needed so the next record starts after a blank line.
    ///
    /// A hand-edited log may lose its trailing blank line; without this the
    /// next entry would run into the previous record's notes.
    fn missing_separator(path: &Path) -> &'static str {
        let Ok(mut f) = File::open(path) else { return "" };
        let len = f.metadata().map(|m| m.len()).unwrap_or(0);
        if len == 0 {
            return "";
        }
        let n = len.min(2) as usize;
        let mut tail = [0u8; 2];
        if f.seek(SeekFrom::End(-(n as i64))).is_err() || f.read_exact(&mut tail[..n]).is_err() {
            return "";
        }
        let tail = &tail[..n];
        if tail.ends_with(b"\n\n") || tail == b"\n" {
            ""
        } else if tail.ends_with(b"\n") {
            "\n"
        } else {
            "\n\n"
        }
    }
}

impl LogStore for FsLogStore {
    fn append(&self, path: &Path, text: &str) -> Result<(), LogError> {
        let io = |source| LogError::Io { path: path.to_path_buf(), source };
        // Parent directories are never created: a missing one is an error.
        let mut f = OpenOptions::new().create(true).append(true).open(path).map_err(io)?;
        f.write_all(text.as_bytes()).map_err(io)?;
        f.flush().map_err(io)?;
        debug!(path = %path.display(), bytes = text.len(), "appended to log");
        Ok(())
    }

    fn text_for(&self, path: &Path, record: &SnapshotRecord) -> String {
        let body = match self.heading {
            HeadingMode::EveryAppend => render(record),
            HeadingMode::Once if Self::is_empty_or_missing(path) => render(record),
            HeadingMode::Once => render_entry(record),
        };
        format!("{}{body}", Self::missing_separator(path))
    }

    fn read_records(&self, path: &Path) -> Result<Vec<SnapshotRecord>, LogError> {
        if !path.exists() {
            return Ok(vec![]);
        }
        let text = std::fs::read_to_string(path)
            .map_err(|source| LogError::Read { path: path.to_path_buf(), source })?;
        parse_log(&text).map_err(|source| LogError::Parse { path: path.to_path_buf(), source })
    }
}

pub fn heading_count(text: &str) -> usize {
    text.lines().filter(|l| l.trim_end() == LOG_HEADING).count()
}
