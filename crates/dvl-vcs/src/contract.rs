use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};

use crate::types::{RepositoryContext, VcsError, VersionControl};

/// Shared adapter contract suite. Expects `ctx` to point at a repository with
/// at least one commit and a clean index.
pub fn run_vcs_contract_suite(vcs: &dyn VersionControl, ctx: &RepositoryContext) -> Result<()> {
    let first = vcs.current_short_commit_id(ctx)?;
    let again = vcs.current_short_commit_id(ctx)?;
    if first != again {
        return Err(anyhow!("commit id changed without a commit: {first} vs {again}"));
    }

    let file = ctx.root.join("contract.txt");
    std::fs::write(&file, "hello")?;
    vcs.stage(ctx, &file)?;
    let rev = vcs.commit(ctx, "contract commit")?;

    let after = vcs.current_short_commit_id(ctx)?;
    if after == first {
        return Err(anyhow!("expected HEAD to advance after commit"));
    }
    if rev.as_str() != after.as_str() {
        return Err(anyhow!("commit returned {rev} but HEAD is {after}"));
    }

    match vcs.commit(ctx, "empty contract commit") {
        Err(VcsError::NothingToCommit) => {}
        other => return Err(anyhow!("expected NothingToCommit, got {other:?}")),
    }
    Ok(())
}

/// Initialize a minimal git repo fixture with one commit.
pub fn init_git_repo(dir: &Path) -> Result<()> {
    init_empty_git_repo(dir)?;
    std::fs::write(dir.join("README.md"), "fixture")?;
    run(dir, &["git", "add", "."])?;
    run(dir, &["git", "commit", "-m", "init"])?;
    Ok(())
}

/// Initialize a git repo with identity configured but no commits.
pub fn init_empty_git_repo(dir: &Path) -> Result<()> {
    run(dir, &["git", "init"])?;
    run(dir, &["git", "config", "user.email", "dvl@example.com"])?;
    run(dir, &["git", "config", "user.name", "dvl"])?;
    run(dir, &["git", "config", "commit.gpgsign", "false"])?;
    Ok(())
}

fn run(dir: &Path, args: &[&str]) -> Result<()> {
    let (program, rest) = args.split_first().context("empty fixture command")?;
    let out = Command::new(program)
        .args(rest)
        .current_dir(dir)
        .output()
        .with_context(|| format!("spawn `{}` in {}", args.join(" "), dir.display()))?;
    if out.status.success() {
        return Ok(());
    }
    Err(anyhow!(
        "`{}` exited with {} in {}: {}",
        args.join(" "),
        out.status,
        dir.display(),
        String::from_utf8_lossy(&out.stderr).trim()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_fixture_command_names_itself() {
        let dir = std::env::temp_dir();
        let err = run(&dir, &["git", "no-such-subcommand"]).unwrap_err().to_string();
        assert!(err.starts_with("`git no-such-subcommand` exited with"), "{err}");
        assert!(run(&dir, &[]).is_err());
    }
}
