use std::fmt;
use std::path::PathBuf;

use dvl_core::CoreError;
use dvl_log::LogError;
use dvl_vcs::VcsError;
use thiserror::Error;

/// Stage of `record_snapshot` at which a failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Validate,
    Resolve,
    Write,
    Commit,
    /// Reading the log back (`show`), outside `record_snapshot`.
    Read,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Validate => "validate",
            Step::Resolve => "resolve",
            Step::Write => "write",
            Step::Commit => "commit",
            Step::Read => "read",
        })
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("validate: at least one tracked path is required")]
    EmptyTrackedPaths,
    #[error("validate: {0}")]
    InvalidTrackedPath(String),
    #[error("{step}: version control unavailable: {reason}")]
    VersionControlUnavailable { step: Step, reason: String },
    #[error("write: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read: {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
    /// The log may already be written when this is raised at the commit step.
    #[error("{step}: version control error: {reason}")]
    VersionControl { step: Step, reason: String },
}

impl RecordError {
    pub fn step(&self) -> Step {
        match self {
            RecordError::EmptyTrackedPaths | RecordError::InvalidTrackedPath(_) => Step::Validate,
            RecordError::Io { .. } => Step::Write,
            RecordError::Read { .. } => Step::Read,
            RecordError::VersionControlUnavailable { step, .. } | RecordError::VersionControl { step, .. } => *step,
        }
    }

    pub fn from_vcs(step: Step, e: VcsError) -> Self {
        match e {
            VcsError::Unavailable(reason) => RecordError::VersionControlUnavailable { step, reason },
            VcsError::NothingToCommit => RecordError::VersionControl { step, reason: e.to_string() },
            VcsError::Failed(reason) => RecordError::VersionControl { step, reason },
        }
    }
}

impl From<CoreError> for RecordError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::EmptyTrackedPaths => RecordError::EmptyTrackedPaths,
            CoreError::EmptyCommitId => RecordError::VersionControl { step: Step::Resolve, reason: e.to_string() },
            other => RecordError::InvalidTrackedPath(other.to_string()),
        }
    }
}

impl From<LogError> for RecordError {
    fn from(e: LogError) -> Self {
        match e {
            LogError::Io { path, source } => RecordError::Io { path, source },
            LogError::Read { path, source } => RecordError::Read { path, reason: source.to_string() },
            LogError::Parse { path, source } => RecordError::Read { path, reason: source.to_string() },
        }
    }
}
