use anyhow::Result;
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::config;
use crate::discovery;
use crate::models::{CollectionReport, RunRecord};
use crate::store::{self, RepoStore};
use crate::summary;
use crate::traffic::TrafficClient;

/// Run the complete daily collection workflow:
/// discovery, then per repository guard -> fetch -> persist -> summarize,
/// then the global summary.
pub async fn run(cli: &Cli) -> Result<CollectionReport> {
    let started = Instant::now();

    // Step 1: credential and client
    let token = config::github_token()?;
    let client = TrafficClient::new(&token)?;
    client.verify_auth().await?;

    // Step 2: repository discovery
    let repos =
        discovery::fetch_tracked_repos(&cli.ecosystem_url, Duration::from_secs(cli.fetch_timeout))
            .await?;

    info!(count = repos.len(), base_dir = %cli.base_dir.display(), "Processing repositories");

    // Step 3: per-repository collection
    let today = store::today_stamp();
    let mut collected = 0usize;
    let mut skipped_existing = 0usize;
    let mut no_data = 0usize;

    for repo in &repos {
        let repo_store = RepoStore::new(&cli.base_dir, repo);

        if repo_store.has_run(&today) {
            info!(repo = %repo, date = %today, "Already collected today, skipping");
            skipped_existing += 1;
            continue;
        }

        let entry = match client.latest_clone_traffic(repo).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                info!(repo = %repo, "No clone data available");
                no_data += 1;
                continue;
            }
            Err(e) => {
                // Per-repository failures never abort the run
                warn!(repo = %repo, error = %e, "Traffic fetch failed, treating as no data");
                no_data += 1;
                continue;
            }
        };

        let record = RunRecord {
            timestamp: entry.timestamp,
            count: entry.count,
            uniques: entry.uniques,
            repo: repo.full_name(),
            collected_at: Utc::now(),
        };

        repo_store.save_run(&today, &record)?;
        summary::update_repo_summary(&repo_store, &repo.full_name())?;
        collected += 1;
    }

    // Step 4: global summary, recomputed even when nothing new was collected
    summary::update_global_summary(&cli.base_dir, &cli.global_summary_file)?;

    let report = CollectionReport {
        status: "Success".to_string(),
        total_repos: repos.len(),
        collected,
        skipped_existing,
        no_data,
        duration_seconds: started.elapsed().as_secs_f64(),
    };

    info!(
        total_repos = report.total_repos,
        collected = report.collected,
        skipped_existing = report.skipped_existing,
        no_data = report.no_data,
        duration_seconds = report.duration_seconds,
        "Collection complete"
    );

    Ok(report)
}
