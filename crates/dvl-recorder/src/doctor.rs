use anyhow::{anyhow, Context, Result};
use tracing::warn;

use dvl_core::ShortCommitId;
use dvl_log::{heading_count, HeadingMode};
use dvl_vcs::{RepositoryContext, VersionControl};

use crate::Config;

#[derive(Clone, Debug)]
pub struct DoctorReport {
    pub commit_id: ShortCommitId,
    pub records: usize,
    pub warnings: Vec<String>,
}

/// Check that a `record` would get past its resolve and write steps.
///
/// Hard problems fail; missing tracked files and heading drift are warnings.
pub fn doctor(ctx: &RepositoryContext, cfg: &Config, vcs: &dyn VersionControl) -> Result<DoctorReport> {
    let commit_id = vcs.current_short_commit_id(ctx).context("resolve")?;

    let log_path = cfg.log_path(ctx);
    match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            return Err(anyhow!("log directory {} does not exist", parent.display()));
        }
        _ => {}
    }

    let mut warnings = Vec::new();
    let mut records = 0;
    if log_path.exists() {
        let text = std::fs::read_to_string(&log_path).with_context(|| format!("read {}", log_path.display()))?;
        records = dvl_core::parse_log(&text)
            .with_context(|| format!("parse {}", log_path.display()))?
            .len();
        let headings = heading_count(&text);
        if cfg.log.heading == HeadingMode::Once && headings > 1 {
            warnings.push(format!(
                "{} has {headings} headings but heading mode is `once`",
                log_path.display()
            ));
        }
    }

    for stage in &cfg.stages {
        for t in stage.tracked_paths()? {
            let p = ctx.resolve(std::path::Path::new(&t.path));
            if !p.exists() {
                warnings.push(format!("stage {}: tracked path {} ({}) is missing", stage.name, t.path, t.label));
            }
        }
    }

    for w in &warnings {
        warn!("{w}");
    }
    Ok(DoctorReport { commit_id, records, warnings })
}
