use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("at least one tracked path is required")]
    EmptyTrackedPaths,
    #[error("commit id is empty")]
    EmptyCommitId,
    #[error("invalid tracked path: {0}")]
    InvalidTrackedPath(String),
    #[error("log parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },
}
