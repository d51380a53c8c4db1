use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{DailyEntry, GlobalSummary, RepoSummary};
use crate::store::RepoStore;

/// Counters one run file contributes to the fold. Fields missing from an
/// otherwise valid record default to zero; structurally invalid JSON rejects
/// the whole file.
#[derive(Debug, Default, Deserialize)]
struct RunCounts {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    uniques: u64,
}

/// Recompute one repository's summary from its run files and persist it,
/// overwriting any prior summary.
pub fn update_repo_summary(store: &RepoStore, repo_name: &str) -> Result<RepoSummary> {
    let runs = load_runs(&store.runs_dir());
    let summary = fold_runs(repo_name, &runs);

    let path = store.summary_path();
    let body =
        serde_json::to_string_pretty(&summary).context("Failed to serialize repo summary")?;
    fs::write(&path, body)
        .with_context(|| format!("Failed to write summary file {}", path.display()))?;

    info!(
        repo = %repo_name,
        total_days_tracked = summary.total_days_tracked,
        total_clones = summary.total_clones,
        "Updated repository summary"
    );

    Ok(summary)
}

/// Recompute the cross-repository summary from every per-repo summary file
/// and persist it, overwriting any prior file.
pub fn update_global_summary(base_dir: &Path, output_path: &Path) -> Result<GlobalSummary> {
    let summaries = load_summaries(base_dir);
    let global = fold_summaries(summaries);

    let body =
        serde_json::to_string_pretty(&global).context("Failed to serialize global summary")?;
    fs::write(output_path, body)
        .with_context(|| format!("Failed to write global summary {}", output_path.display()))?;

    info!(
        total_repos_tracked = global.total_repos_tracked,
        total_clones_all_repos = global.total_clones_all_repos,
        "Updated global summary"
    );

    Ok(global)
}

/// Read every dated run file in ascending date order. Unreadable or
/// unparseable files are skipped with a warning, never fatal.
fn load_runs(runs_dir: &Path) -> Vec<(String, RunCounts)> {
    let mut runs = Vec::new();

    let entries = match fs::read_dir(runs_dir) {
        Ok(entries) => entries,
        // No runs directory yet means no runs
        Err(_) => return runs,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(date) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable run file");
                continue;
            }
        };

        match serde_json::from_str::<RunCounts>(&content) {
            Ok(counts) => runs.push((date.to_string(), counts)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unparseable run file");
            }
        }
    }

    // YYYY-MM-DD filenames sort chronologically
    runs.sort_by(|a, b| a.0.cmp(&b.0));
    runs
}

/// Pure fold from parsed runs to a repository summary.
fn fold_runs(repo_name: &str, runs: &[(String, RunCounts)]) -> RepoSummary {
    let mut daily_history = Vec::with_capacity(runs.len());
    let mut total_clones: u64 = 0;
    // The uniques figure covers a rolling 14-day window, so values from
    // overlapping windows cannot be deduplicated; report the largest single
    // window seen instead.
    let mut max_uniques: u64 = 0;

    for (date, counts) in runs {
        daily_history.push(DailyEntry {
            date: date.clone(),
            clones: counts.count,
            unique_cloners: counts.uniques,
        });
        total_clones += counts.count;
        max_uniques = max_uniques.max(counts.uniques);
    }

    RepoSummary {
        repo_name: repo_name.to_string(),
        last_updated: Utc::now(),
        total_days_tracked: daily_history.len(),
        total_clones,
        max_unique_cloners_in_window: max_uniques,
        first_tracked: daily_history.first().map(|entry| entry.date.clone()),
        last_tracked: daily_history.last().map(|entry| entry.date.clone()),
        daily_history,
    }
}

/// Collect every readable per-repo summary under the base directory, in
/// directory-name order. Missing or malformed summaries are skipped with a
/// warning, never fatal.
fn load_summaries(base_dir: &Path) -> Vec<RepoSummary> {
    let mut summaries = Vec::new();

    let entries = match fs::read_dir(base_dir) {
        Ok(entries) => entries,
        Err(_) => return summaries,
    };

    let mut dirs: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    for dir in dirs {
        let summary_path = dir.join("summary.json");
        if !summary_path.is_file() {
            continue;
        }

        let content = match fs::read_to_string(&summary_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %summary_path.display(), error = %e, "Skipping unreadable summary");
                continue;
            }
        };

        match serde_json::from_str::<RepoSummary>(&content) {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                warn!(path = %summary_path.display(), error = %e, "Skipping unparseable summary");
            }
        }
    }

    summaries
}

/// Pure fold from repository summaries to the global summary.
fn fold_summaries(mut summaries: Vec<RepoSummary>) -> GlobalSummary {
    // Stable sort: equal totals keep directory-scan order
    summaries.sort_by(|a, b| b.total_clones.cmp(&a.total_clones));

    GlobalSummary {
        last_updated: Utc::now(),
        total_repos_tracked: summaries.len(),
        total_clones_all_repos: summaries.iter().map(|s| s.total_clones).sum(),
        repositories: summaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepoId;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_run(runs_dir: &Path, date: &str, count: u64, uniques: u64) {
        fs::create_dir_all(runs_dir).unwrap();
        let body = format!(
            r#"{{"timestamp": "{}T00:00:00Z", "count": {}, "uniques": {}, "repo": "o/a", "collected_at": "{}T06:00:00Z"}}"#,
            date, count, uniques, date
        );
        fs::write(runs_dir.join(format!("{}.json", date)), body).unwrap();
    }

    #[test]
    fn test_summary_totals_and_bounds() {
        let base = TempDir::new().unwrap();
        let store = RepoStore::new(base.path(), &RepoId::new("o", "a"));
        write_run(&store.runs_dir(), "2026-08-01", 10, 4);
        write_run(&store.runs_dir(), "2026-08-03", 7, 1);
        write_run(&store.runs_dir(), "2026-08-02", 5, 9);

        let summary = update_repo_summary(&store, "o/a").unwrap();

        assert_eq!(summary.total_days_tracked, 3);
        assert_eq!(summary.total_clones, 22);
        assert_eq!(summary.max_unique_cloners_in_window, 9);
        assert_eq!(summary.first_tracked.as_deref(), Some("2026-08-01"));
        assert_eq!(summary.last_tracked.as_deref(), Some("2026-08-03"));
        // History is date-ordered regardless of directory iteration order
        let dates: Vec<&str> = summary
            .daily_history
            .iter()
            .map(|e| e.date.as_str())
            .collect();
        assert_eq!(dates, ["2026-08-01", "2026-08-02", "2026-08-03"]);
        assert!(store.summary_path().is_file());
    }

    #[test]
    fn test_empty_history_yields_zeroed_summary() {
        let base = TempDir::new().unwrap();
        let store = RepoStore::new(base.path(), &RepoId::new("o", "a"));
        fs::create_dir_all(store.runs_dir().parent().unwrap()).unwrap();

        let summary = update_repo_summary(&store, "o/a").unwrap();

        assert_eq!(summary.total_days_tracked, 0);
        assert_eq!(summary.total_clones, 0);
        assert_eq!(summary.max_unique_cloners_in_window, 0);
        assert!(summary.first_tracked.is_none());
        assert!(summary.last_tracked.is_none());
    }

    #[test]
    fn test_corrupt_run_file_is_skipped() {
        let base = TempDir::new().unwrap();
        let store = RepoStore::new(base.path(), &RepoId::new("o", "a"));
        write_run(&store.runs_dir(), "2026-08-01", 10, 4);
        write_run(&store.runs_dir(), "2026-08-02", 5, 2);
        let mut corrupt = File::create(store.runs_dir().join("2026-08-03.json")).unwrap();
        corrupt.write_all(b"{ not json").unwrap();

        let summary = update_repo_summary(&store, "o/a").unwrap();

        assert_eq!(summary.total_days_tracked, 2);
        assert_eq!(summary.total_clones, 15);
        assert_eq!(summary.last_tracked.as_deref(), Some("2026-08-02"));
    }

    #[test]
    fn test_missing_count_fields_default_to_zero() {
        let base = TempDir::new().unwrap();
        let store = RepoStore::new(base.path(), &RepoId::new("o", "a"));
        fs::create_dir_all(store.runs_dir()).unwrap();
        fs::write(
            store.runs_dir().join("2026-08-01.json"),
            r#"{"repo": "o/a"}"#,
        )
        .unwrap();
        write_run(&store.runs_dir(), "2026-08-02", 5, 2);

        let summary = update_repo_summary(&store, "o/a").unwrap();

        assert_eq!(summary.total_days_tracked, 2);
        assert_eq!(summary.total_clones, 5);
        assert_eq!(summary.daily_history[0].clones, 0);
    }

    #[test]
    fn test_non_json_files_are_ignored() {
        let base = TempDir::new().unwrap();
        let store = RepoStore::new(base.path(), &RepoId::new("o", "a"));
        write_run(&store.runs_dir(), "2026-08-01", 3, 1);
        fs::write(store.runs_dir().join("notes.txt"), "not a run").unwrap();

        let summary = update_repo_summary(&store, "o/a").unwrap();
        assert_eq!(summary.total_days_tracked, 1);
    }

    fn seed_repo(base: &Path, repo: &RepoId, date: &str, count: u64, uniques: u64) {
        let store = RepoStore::new(base, repo);
        write_run(&store.runs_dir(), date, count, uniques);
        update_repo_summary(&store, &repo.full_name()).unwrap();
    }

    #[test]
    fn test_global_summary_totals_and_order() {
        let base = TempDir::new().unwrap();
        seed_repo(base.path(), &RepoId::new("o", "small"), "2026-08-01", 5, 1);
        seed_repo(base.path(), &RepoId::new("o", "big"), "2026-08-01", 10, 3);
        seed_repo(base.path(), &RepoId::new("o", "mid"), "2026-08-01", 7, 2);

        let out = base.path().join("global-summary.json");
        let global = update_global_summary(base.path(), &out).unwrap();

        assert_eq!(global.total_repos_tracked, 3);
        assert_eq!(global.total_clones_all_repos, 22);
        let names: Vec<&str> = global
            .repositories
            .iter()
            .map(|s| s.repo_name.as_str())
            .collect();
        assert_eq!(names, ["o/big", "o/mid", "o/small"]);
        assert!(out.is_file());
    }

    #[test]
    fn test_global_sort_is_stable_for_ties() {
        let base = TempDir::new().unwrap();
        seed_repo(base.path(), &RepoId::new("o", "alpha"), "2026-08-01", 5, 1);
        seed_repo(base.path(), &RepoId::new("o", "beta"), "2026-08-01", 5, 1);

        let out = base.path().join("global-summary.json");
        let global = update_global_summary(base.path(), &out).unwrap();

        // Equal totals keep directory-scan (sorted name) order
        let names: Vec<&str> = global
            .repositories
            .iter()
            .map(|s| s.repo_name.as_str())
            .collect();
        assert_eq!(names, ["o/alpha", "o/beta"]);
    }

    #[test]
    fn test_malformed_repo_summary_is_skipped() {
        let base = TempDir::new().unwrap();
        seed_repo(base.path(), &RepoId::new("o", "good"), "2026-08-01", 5, 1);
        let broken_dir = base.path().join("o_broken");
        fs::create_dir_all(&broken_dir).unwrap();
        fs::write(broken_dir.join("summary.json"), "{ nope").unwrap();

        let out = base.path().join("global-summary.json");
        let global = update_global_summary(base.path(), &out).unwrap();

        assert_eq!(global.total_repos_tracked, 1);
        assert_eq!(global.total_clones_all_repos, 5);
    }

    #[test]
    fn test_missing_base_dir_yields_empty_global() {
        let base = TempDir::new().unwrap();
        let out = base.path().join("global-summary.json");
        let global = update_global_summary(&base.path().join("absent"), &out).unwrap();

        assert_eq!(global.total_repos_tracked, 0);
        assert_eq!(global.total_clones_all_repos, 0);
        assert!(global.repositories.is_empty());
    }
}
