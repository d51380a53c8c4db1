use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A repository identified by its `owner/name` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// Canonical `owner/name` form used in records and summaries.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Filesystem-safe directory name (`/` replaced with `_`).
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Clone traffic report returned by `GET /repos/{owner}/{repo}/traffic/clones`.
#[derive(Debug, Deserialize)]
pub struct CloneActivity {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
    #[serde(default)]
    pub clones: Vec<CloneEntry>,
}

/// One day of clone traffic within the API's rolling window.
#[derive(Debug, Clone, Deserialize)]
pub struct CloneEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
}

/// One persisted daily snapshot, immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Utc>,
    pub count: u64,
    pub uniques: u64,
    pub repo: String,
    pub collected_at: DateTime<Utc>,
}

/// One day's entry in a repository summary's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyEntry {
    pub date: String,
    pub clones: u64,
    pub unique_cloners: u64,
}

/// Cumulative per-repository summary, recomputed wholesale on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummary {
    pub repo_name: String,
    pub last_updated: DateTime<Utc>,
    pub total_days_tracked: usize,
    pub total_clones: u64,
    pub max_unique_cloners_in_window: u64,
    pub first_tracked: Option<String>,
    pub last_tracked: Option<String>,
    pub daily_history: Vec<DailyEntry>,
}

/// Cross-repository summary, recomputed wholesale on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSummary {
    pub last_updated: DateTime<Utc>,
    pub total_repos_tracked: usize,
    pub total_clones_all_repos: u64,
    pub repositories: Vec<RepoSummary>,
}

/// Execution summary for one collector invocation.
#[derive(Debug, Serialize)]
pub struct CollectionReport {
    pub status: String,
    pub total_repos: usize,
    pub collected: usize,
    pub skipped_existing: usize,
    pub no_data: usize,
    pub duration_seconds: f64,
}
