use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dvl_core::TrackedPath;
use dvl_recorder::{doctor, plan_stage, Config, SnapshotRecorder};
use dvl_vcs::RepositoryContext;
use dvl_vcs_git::GitAdapter;

#[derive(Parser)]
#[command(name = "dvl", version, about = "Append commit-linked data snapshots to a version log")]
struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default .dvl/dvl.toml if none exists
    Init,

    /// Check the repository, log location and tracked paths
    Doctor,

    /// Append a snapshot record to the log and commit it
    Record {
        /// Stage from dvl.toml supplying tracked paths and notes
        #[arg(long)]
        stage: Option<String>,
        /// Tracked dataset; overrides the stage's set (repeatable)
        #[arg(long = "track", value_name = "LABEL=PATH", value_parser = parse_track)]
        track: Vec<TrackedPath>,
        /// Notes text; overrides the stage's template
        #[arg(long)]
        notes: Option<String>,
    },

    /// List recorded snapshots
    Show {
        #[arg(long)]
        json: bool,
    },
}

fn parse_track(s: &str) -> Result<TrackedPath, String> {
    TrackedPath::parse_pair(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let repo_root = match cli.repo {
        Some(p) => p,
        None => std::env::current_dir()?,
    };
    let ctx = RepositoryContext::new(repo_root.clone());

    match cli.cmd {
        Command::Init => {
            let path = Config::config_path(&repo_root);
            if path.exists() {
                println!("{} already exists", path.display());
            } else {
                Config::default().save_to(&path)?;
                println!("Wrote {}", path.display());
            }
        }
        Command::Doctor => {
            let cfg = Config::load_or_default(&repo_root)?;
            let report = doctor(&ctx, &cfg, &GitAdapter::default())?;
            println!(
                "OK commit={} records={} warnings={}",
                report.commit_id,
                report.records,
                report.warnings.len()
            );
        }
        Command::Record { stage, track, notes } => {
            let cfg = Config::load_or_default(&repo_root)?;
            let plan = plan_stage(&cfg, stage.as_deref(), track, notes)?;
            let recorder = SnapshotRecorder::from_config(ctx, &cfg);
            let out = recorder.record_snapshot(plan.tracked, &plan.notes)?;
            println!(
                "Recorded snapshot at {} ({} tracked) -> {} [{}]",
                out.record.commit_id,
                out.record.tracked_paths.len(),
                out.log_path.display(),
                out.revision
            );
        }
        Command::Show { json } => {
            let cfg = Config::load_or_default(&repo_root)?;
            let recorder = SnapshotRecorder::from_config(ctx, &cfg);
            let records = recorder.read_records()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("Snapshots: {}", records.len());
                for r in records {
                    let labels: Vec<&str> = r.tracked_paths.iter().map(|t| t.label.as_str()).collect();
                    println!(
                        "- {} {} [{}] {}",
                        dvl_core::format_timestamp(&r.timestamp),
                        r.commit_id,
                        labels.join(", "),
                        r.notes.lines().next().unwrap_or("")
                    );
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn record_accepts_repeated_tracks() {
        let cli = Cli::try_parse_from([
            "dvl", "record", "--track", "raw_data=raw_data.dvc", "--track", "data/clean=data/clean.dvc",
            "--notes", "Stage 8 snapshot",
        ])
        .unwrap();
        match cli.cmd {
            Command::Record { stage, track, notes } => {
                assert!(stage.is_none());
                assert_eq!(track.len(), 2);
                assert_eq!(track[1].path, "data/clean.dvc");
                assert_eq!(notes.as_deref(), Some("Stage 8 snapshot"));
            }
            _ => panic!("expected record"),
        }
    }

    #[test]
    fn malformed_track_is_rejected() {
        assert!(Cli::try_parse_from(["dvl", "record", "--track", "raw_data"]).is_err());
    }
}
