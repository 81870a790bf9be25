use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use dvl_core::TrackedPath;
use dvl_log::HeadingMode;
use dvl_vcs::RepositoryContext;

pub const DEFAULT_LOG_PATH: &str = "data_version_log.md";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update data version log";
pub const DEFAULT_STAGE_NOTES: &str = "Stage {stage} snapshot";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub commit: CommitConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<StageConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    pub path: String,
    #[serde(default)]
    pub heading: HeadingMode,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { path: DEFAULT_LOG_PATH.to_string(), heading: HeadingMode::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommitConfig {
    pub message: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self { message: DEFAULT_COMMIT_MESSAGE.to_string() }
    }
}

/// A pipeline stage and the datasets it snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub name: String,
    /// Notes template; `{stage}` expands to `name`.
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tracked: Vec<TrackedPath>,
}

impl StageConfig {
    pub fn notes_text(&self) -> String {
        self.notes
            .as_deref()
            .unwrap_or(DEFAULT_STAGE_NOTES)
            .replace("{stage}", &self.name)
    }

    /// Tracked paths re-validated; the public fields may have been edited after loading.
    pub fn tracked_paths(&self) -> Result<Vec<TrackedPath>> {
        self.tracked
            .iter()
            .map(TrackedPath::validate)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("stage {}", self.name))
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| "parse dvl.toml")?;
        Ok(cfg)
    }

    /// Load `.dvl/dvl.toml` under the repo, falling back to defaults.
    pub fn load_or_default(repo_root: &Path) -> Result<Self> {
        let path = Self::config_path(repo_root);
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path(repo_root: &Path) -> PathBuf {
        repo_root.join(".dvl").join("dvl.toml")
    }

    /// Log location with `~` expanded, resolved against the repository root.
    pub fn log_path(&self, ctx: &RepositoryContext) -> PathBuf {
        let expanded = shellexpand::tilde(&self.log.path).to_string();
        ctx.resolve(Path::new(&expanded))
    }

    pub fn stage(&self, name: &str) -> Option<&StageConfig> {
        self.stages.iter().find(|s| s.name == name)
    }
}

/// Tracked set and notes for one `record` invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct StagePlan {
    pub tracked: Vec<TrackedPath>,
    pub notes: String,
}

/// Combine a configured stage with command-line overrides.
///
/// Explicit `track` entries replace the stage's tracked set; explicit `notes`
/// replace the templated notes. An empty result is left to the recorder to
/// reject.
pub fn plan_stage(
    cfg: &Config,
    stage: Option<&str>,
    track: Vec<TrackedPath>,
    notes: Option<String>,
) -> Result<StagePlan> {
    let stage_cfg = match stage {
        Some(name) => Some(cfg.stage(name).ok_or_else(|| anyhow!("unknown stage {name:?} in dvl.toml"))?),
        None => None,
    };
    let tracked = match (track.is_empty(), stage_cfg) {
        (false, _) => track,
        (true, Some(s)) => s.tracked_paths()?,
        (true, None) => vec![],
    };
    let notes = notes
        .or_else(|| stage_cfg.map(StageConfig::notes_text))
        .unwrap_or_default();
    Ok(StagePlan { tracked, notes })
}
