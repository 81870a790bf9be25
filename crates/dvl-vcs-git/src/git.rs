use std::path::Path;
use std::process::{Command, Output};

use dvl_core::{RevId, ShortCommitId};
use dvl_vcs::{RepositoryContext, VcsError, VersionControl};
use tracing::debug;

/// `VersionControl` backed by the `git` binary on PATH.
#[derive(Clone, Debug)]
pub struct GitAdapter {
    pub program: String,
}

impl Default for GitAdapter {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitAdapter {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    fn command(&self, ctx: &RepositoryContext) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&ctx.root);
        cmd
    }

    fn output(&self, mut cmd: Command) -> Result<Output, VcsError> {
        debug!(cmd = ?cmd, "git");
        cmd.output()
            .map_err(|e| VcsError::Unavailable(format!("cannot run {}: {e}", self.program)))
    }

    fn run(&self, ctx: &RepositoryContext, args: &[&str]) -> Result<String, VcsError> {
        let mut cmd = self.command(ctx);
        cmd.args(args);
        let out = self.output(cmd)?;
        if !out.status.success() {
            return Err(VcsError::Failed(failure_text(args, &out)));
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    fn ensure_repo(&self, ctx: &RepositoryContext) -> Result<(), VcsError> {
        if !ctx.root.is_dir() {
            return Err(VcsError::Unavailable(format!("{} does not exist", ctx.root.display())));
        }
        self.run(ctx, &["rev-parse", "--show-toplevel"])
            .map(|_| ())
            .map_err(|e| match e {
                VcsError::Unavailable(_) => e,
                _ => VcsError::Unavailable(format!("{} is not inside a git repository", ctx.root.display())),
            })
    }

    fn head_short(&self, ctx: &RepositoryContext) -> Result<String, VcsError> {
        self.run(ctx, &["rev-parse", "--verify", "--quiet", "--short", "HEAD"])
            .map_err(|_| VcsError::Unavailable("repository has no commits yet".to_string()))
    }

    fn has_staged_changes(&self, ctx: &RepositoryContext) -> Result<bool, VcsError> {
        let mut cmd = self.command(ctx);
        cmd.args(["diff", "--cached", "--quiet"]);
        let out = self.output(cmd)?;
        match out.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(VcsError::Failed(failure_text(&["diff", "--cached", "--quiet"], &out))),
        }
    }
}

fn failure_text(args: &[&str], out: &Output) -> String {
    format!(
        "git {}: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stderr).trim()
    )
}

impl VersionControl for GitAdapter {
    fn name(&self) -> &'static str {
        "git"
    }

    fn current_short_commit_id(&self, ctx: &RepositoryContext) -> Result<ShortCommitId, VcsError> {
        self.ensure_repo(ctx)?;
        Ok(ShortCommitId::from_str(self.head_short(ctx)?))
    }

    fn stage(&self, ctx: &RepositoryContext, path: &Path) -> Result<(), VcsError> {
        self.ensure_repo(ctx)?;
        // An unborn HEAD is unavailable here too, as in resolve.
        self.head_short(ctx)?;
        // git resolves the worktree through symlinks; pass paths under the
        // context root relative to it.
        let rel = path.strip_prefix(&ctx.root).unwrap_or(path);
        let mut cmd = self.command(ctx);
        cmd.args(["add", "--"]).arg(rel);
        let out = self.output(cmd)?;
        if !out.status.success() {
            return Err(VcsError::Failed(format!(
                "git add {}: {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(())
    }

    fn commit(&self, ctx: &RepositoryContext, message: &str) -> Result<RevId, VcsError> {
        self.ensure_repo(ctx)?;
        self.head_short(ctx)?;
        if !self.has_staged_changes(ctx)? {
            return Err(VcsError::NothingToCommit);
        }
        self.run(ctx, &["commit", "-m", message])?;
        Ok(RevId::from_str(self.head_short(ctx)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dvl_vcs::contract::{init_empty_git_repo, init_git_repo, run_vcs_contract_suite};
    use tempfile::tempdir;

    #[test]
    fn git_adapter_contract() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path()).unwrap();
        let ctx = RepositoryContext::new(dir.path());
        run_vcs_contract_suite(&GitAdapter::default(), &ctx).unwrap();
    }

    #[test]
    fn short_id_matches_rev_parse() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path()).unwrap();
        let ctx = RepositoryContext::new(dir.path());
        let git = GitAdapter::default();
        let expected = git.run(&ctx, &["rev-parse", "--short", "HEAD"]).unwrap();
        assert_eq!(git.current_short_commit_id(&ctx).unwrap().as_str(), expected);
    }

    #[test]
    fn not_a_repository_is_unavailable() {
        let dir = tempdir().unwrap();
        let ctx = RepositoryContext::new(dir.path());
        let err = GitAdapter::default().current_short_commit_id(&ctx).unwrap_err();
        assert!(matches!(err, VcsError::Unavailable(_)), "{err:?}");
    }

    #[test]
    fn missing_root_is_unavailable() {
        let dir = tempdir().unwrap();
        let ctx = RepositoryContext::new(dir.path().join("nope"));
        let err = GitAdapter::default().current_short_commit_id(&ctx).unwrap_err();
        assert!(matches!(err, VcsError::Unavailable(_)));
    }

    #[test]
    fn empty_history_is_unavailable() {
        let dir = tempdir().unwrap();
        init_empty_git_repo(dir.path()).unwrap();
        let ctx = RepositoryContext::new(dir.path());
        let err = GitAdapter::default().current_short_commit_id(&ctx).unwrap_err();
        assert_eq!(err, VcsError::Unavailable("repository has no commits yet".into()));
    }

    #[test]
    fn empty_history_refuses_stage_and_commit() {
        let dir = tempdir().unwrap();
        init_empty_git_repo(dir.path()).unwrap();
        let file = dir.path().join("data_version_log.md");
        std::fs::write(&file, "# Data Version Log\n").unwrap();
        let ctx = RepositoryContext::new(dir.path());
        let git = GitAdapter::default();

        let unavailable = VcsError::Unavailable("repository has no commits yet".into());
        assert_eq!(git.stage(&ctx, &file).unwrap_err(), unavailable);
        assert_eq!(git.commit(&ctx, "Update data version log").unwrap_err(), unavailable);

        // Nothing was staged or committed: HEAD is still unborn.
        assert!(git.run(&ctx, &["rev-parse", "--verify", "--quiet", "HEAD"]).is_err());
        assert_eq!(git.run(&ctx, &["diff", "--cached", "--name-only"]).unwrap(), "");
    }

    #[test]
    fn staging_an_ignored_path_fails() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path()).unwrap();
        std::fs::write(dir.path().join(".gitignore"), "*.md.log\n").unwrap();
        std::fs::write(dir.path().join("dv.md.log"), "x").unwrap();
        let ctx = RepositoryContext::new(dir.path());
        let err = GitAdapter::default().stage(&ctx, Path::new("dv.md.log")).unwrap_err();
        assert!(matches!(err, VcsError::Failed(_)), "{err:?}");
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let dir = tempdir().unwrap();
        let ctx = RepositoryContext::new(dir.path());
        let git = GitAdapter::new("git-binary-that-does-not-exist");
        let err = git.current_short_commit_id(&ctx).unwrap_err();
        assert!(matches!(err, VcsError::Unavailable(_)));
    }
}
