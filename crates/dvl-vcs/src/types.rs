use std::path::{Path, PathBuf};

use dvl_core::{RevId, ShortCommitId};
use thiserror::Error;

/// Explicit handle on the repository the recorder operates in.
///
/// Every version-control call takes one of these instead of relying on the
/// process working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryContext {
    pub root: PathBuf,
}

impl RepositoryContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a repo-relative path; absolute paths are returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VcsError {
    /// No repository at or above the context root, no commits yet, or the
    /// tool itself could not be started.
    #[error("version control unavailable: {0}")]
    Unavailable(String),
    #[error("nothing to commit")]
    NothingToCommit,
    #[error("version control command failed: {0}")]
    Failed(String),
}

pub trait VersionControl: Send + Sync {
    fn name(&self) -> &'static str;

    fn current_short_commit_id(&self, ctx: &RepositoryContext) -> Result<ShortCommitId, VcsError>;

    fn stage(&self, ctx: &RepositoryContext, path: &Path) -> Result<(), VcsError>;

    /// Commit whatever is staged. Fails with `NothingToCommit` when the index
    /// matches HEAD.
    fn commit(&self, ctx: &RepositoryContext, message: &str) -> Result<RevId, VcsError>;
}
