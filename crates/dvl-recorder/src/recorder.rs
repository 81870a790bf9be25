use std::path::PathBuf;

use chrono::NaiveDateTime;
use dvl_core::{capture_timestamp, validate_tracked_paths, RevId, ShortCommitId, SnapshotRecord, TrackedPath};
use dvl_log::{FsLogStore, LogStore};
use dvl_vcs::{RepositoryContext, VersionControl};
use dvl_vcs_git::GitAdapter;
use tracing::info;

use crate::{config::Config, error::RecordError, error::Step};

/// Result of one successful `record_snapshot`.
#[derive(Clone, Debug)]
pub struct RecordOutcome {
    pub record: SnapshotRecord,
    /// Exact text appended to the log.
    pub text: String,
    pub log_path: PathBuf,
    pub revision: RevId,
}

/// Appends snapshot records to the data version log and commits the log.
///
/// Invocations must be serialized by the caller: nothing here locks the log
/// file or the repository.
pub struct SnapshotRecorder {
    pub ctx: RepositoryContext,
    pub vcs: Box<dyn VersionControl>,
    pub log: Box<dyn LogStore>,
    pub log_path: PathBuf,
    pub commit_message: String,
}

impl SnapshotRecorder {
    pub fn new(
        ctx: RepositoryContext,
        vcs: Box<dyn VersionControl>,
        log: Box<dyn LogStore>,
        log_path: impl Into<PathBuf>,
        commit_message: impl Into<String>,
    ) -> Self {
        let log_path = ctx.resolve(&log_path.into());
        Self { ctx, vcs, log, log_path, commit_message: commit_message.into() }
    }

    /// Git-backed recorder writing to the configured log.
    pub fn from_config(ctx: RepositoryContext, cfg: &Config) -> Self {
        let log_path = cfg.log_path(&ctx);
        Self::new(
            ctx,
            Box::new(GitAdapter::default()),
            Box::new(FsLogStore::new(cfg.log.heading)),
            log_path,
            cfg.commit.message.clone(),
        )
    }

    pub fn resolve_commit_id(&self) -> Result<ShortCommitId, RecordError> {
        self.vcs
            .current_short_commit_id(&self.ctx)
            .map_err(|e| RecordError::from_vcs(Step::Resolve, e))
    }

    pub fn append(&self, text: &str) -> Result<(), RecordError> {
        self.log.append(&self.log_path, text)?;
        Ok(())
    }

    /// Stage the log and commit it with `message`.
    pub fn commit_artifact(&self, message: &str) -> Result<RevId, RecordError> {
        self.vcs
            .stage(&self.ctx, &self.log_path)
            .map_err(|e| RecordError::from_vcs(Step::Commit, e))?;
        self.vcs
            .commit(&self.ctx, message)
            .map_err(|e| RecordError::from_vcs(Step::Commit, e))
    }

    pub fn record_snapshot(&self, tracked_paths: Vec<TrackedPath>, notes: &str) -> Result<RecordOutcome, RecordError> {
        self.record_snapshot_at(capture_timestamp(), tracked_paths, notes)
    }

    /// Resolve, build, render, append, commit. The first failing step aborts
    /// the rest; a commit failure leaves the appended text in place.
    pub fn record_snapshot_at(
        &self,
        now: NaiveDateTime,
        tracked_paths: Vec<TrackedPath>,
        notes: &str,
    ) -> Result<RecordOutcome, RecordError> {
        let tracked_paths = validate_tracked_paths(tracked_paths)?;

        let commit_id = self.resolve_commit_id()?;
        info!(commit = %commit_id, "resolved commit id");

        let record = SnapshotRecord::new(now, commit_id, tracked_paths, notes)?;
        let text = self.log.text_for(&self.log_path, &record);

        self.append(&text)?;
        info!(path = %self.log_path.display(), tracked = record.tracked_paths.len(), "appended snapshot");

        let revision = self.commit_artifact(&self.commit_message)?;
        info!(revision = %revision, vcs = self.vcs.name(), "committed data version log");

        Ok(RecordOutcome { record, text, log_path: self.log_path.clone(), revision })
    }

    pub fn read_records(&self) -> Result<Vec<SnapshotRecord>, RecordError> {
        Ok(self.log.read_records(&self.log_path)?)
    }
}
