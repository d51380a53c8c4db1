use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::{RepoId, RunRecord};

/// Today's date in UTC, the key for one run file.
pub fn today_stamp() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Per-repository slice of the on-disk state tree:
/// `<base>/<owner_repo>/runs/<date>.json` plus `<base>/<owner_repo>/summary.json`.
pub struct RepoStore {
    dir: PathBuf,
}

impl RepoStore {
    pub fn new(base_dir: &Path, repo: &RepoId) -> Self {
        Self {
            dir: base_dir.join(repo.dir_name()),
        }
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.dir.join("runs")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join("summary.json")
    }

    pub fn run_path(&self, date: &str) -> PathBuf {
        self.runs_dir().join(format!("{}.json", date))
    }

    /// Whether a snapshot for the given date already exists. This is the
    /// guard that makes the daily job idempotent; it has no side effects.
    pub fn has_run(&self, date: &str) -> bool {
        self.run_path(date).is_file()
    }

    /// Persist one day's snapshot, creating the run directory as needed.
    /// Overwrites an existing file for the same date.
    pub fn save_run(&self, date: &str, record: &RunRecord) -> Result<PathBuf> {
        let runs_dir = self.runs_dir();
        fs::create_dir_all(&runs_dir)
            .with_context(|| format!("Failed to create run directory {}", runs_dir.display()))?;

        let path = self.run_path(date);
        let body =
            serde_json::to_string_pretty(record).context("Failed to serialize run record")?;
        fs::write(&path, body)
            .with_context(|| format!("Failed to write run file {}", path.display()))?;

        info!(path = %path.display(), "Saved daily run");
        Ok(path)
    }
}
