use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

use crate::models::RepoId;

// Matches [text](https://github.com/owner/repo). The repo segment cannot
// contain '/', so links into subpaths (tree/..., issues/...) do not match.
const LINK_PATTERN: &str = r"\[[^\]]+\]\(https://github\.com/([^/\s)]+)/([^/\s)]+)\)";

fn link_regex() -> &'static Regex {
    static LINK_RE: OnceLock<Regex> = OnceLock::new();
    LINK_RE.get_or_init(|| Regex::new(LINK_PATTERN).expect("link pattern is valid"))
}

/// Download the ecosystem document and extract the repositories it links to.
///
/// Any fetch failure is fatal: without the repository list there is nothing
/// to collect.
pub async fn fetch_tracked_repos(url: &str, timeout: Duration) -> Result<Vec<RepoId>> {
    info!(url = %url, "Fetching ecosystem document");

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch ecosystem document from {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!(
            "Ecosystem document fetch returned non-success status: {}",
            response.status()
        );
    }

    let content = response
        .text()
        .await
        .context("Failed to read ecosystem document body")?;

    let repos = extract_repo_links(&content);
    info!(count = repos.len(), "Found repositories to track");

    Ok(repos)
}

/// Extract unique `owner/repo` pairs from markdown links, preserving
/// first-seen order.
pub fn extract_repo_links(markdown: &str) -> Vec<RepoId> {
    let mut seen = HashSet::new();
    let mut repos = Vec::new();

    for caps in link_regex().captures_iter(markdown) {
        let owner = &caps[1];
        // Trailing query or fragment belongs to the link, not the repo name
        let name = match caps[2].split(['?', '#']).next() {
            Some(name) if !name.is_empty() => name,
            _ => continue,
        };

        let repo = RepoId::new(owner, name);
        if seen.insert(repo.full_name()) {
            repos.push(repo);
        }
    }

    repos
}
