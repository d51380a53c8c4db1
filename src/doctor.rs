use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::Cli;
use crate::config;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const GITHUB_META_URL: &str = "https://api.github.com/meta";
const EXPECTED_FILES: [&str; 3] = [
    "Cargo.toml",
    "README.md",
    ".github/workflows/daily-stats.yml",
];

#[derive(Debug, Tabled)]
struct CheckResult {
    #[tabled(rename = "CHECK")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

impl CheckResult {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            name: name.to_string(),
            status: "PASS".to_string(),
            detail,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            name: name.to_string(),
            status: "FAIL".to_string(),
            detail,
        }
    }

    fn passed(&self) -> bool {
        self.status == "PASS"
    }
}

/// Run every setup check and print a pass/fail report.
/// All checks always run; returns `true` only when all of them pass.
pub async fn run(cli: &Cli) -> Result<bool> {
    let results = vec![
        check_token(),
        check_github_api().await,
        check_ecosystem_document(&cli.ecosystem_url).await,
        check_project_files(),
    ];

    let table = Table::new(&results).with(Style::sharp()).to_string();
    println!("{}", table);

    let passed = results.iter().filter(|r| r.passed()).count();
    println!("\nSummary: {}/{} checks passed.", passed, results.len());

    Ok(passed == results.len())
}

fn check_token() -> CheckResult {
    if config::token_present() {
        CheckResult::pass("GitHub token", "found in environment".to_string())
    } else {
        CheckResult::fail(
            "GitHub token",
            format!(
                "set {} or {}",
                config::TOKEN_ENV_VARS[0],
                config::TOKEN_ENV_VARS[1]
            ),
        )
    }
}

async fn check_github_api() -> CheckResult {
    match probe(GITHUB_META_URL).await {
        Ok(_) => CheckResult::pass("GitHub API", "reachable".to_string()),
        Err(e) => CheckResult::fail("GitHub API", e),
    }
}

async fn check_ecosystem_document(url: &str) -> CheckResult {
    match probe(url).await {
        Ok(body) => CheckResult::pass(
            "Ecosystem document",
            format!("fetched {} characters", body.len()),
        ),
        Err(e) => CheckResult::fail("Ecosystem document", e),
    }
}

fn check_project_files() -> CheckResult {
    let missing: Vec<&str> = EXPECTED_FILES
        .iter()
        .copied()
        .filter(|file| !Path::new(file).exists())
        .collect();

    if missing.is_empty() {
        CheckResult::pass(
            "Project files",
            format!("{} files present", EXPECTED_FILES.len()),
        )
    } else {
        CheckResult::fail("Project files", format!("missing: {}", missing.join(", ")))
    }
}

/// Fetch a URL with a bounded timeout, returning the body on success and a
/// printable reason on failure. No retries: the doctor reports the first
/// answer it gets.
async fn probe(url: &str) -> Result<String, String> {
    let client = reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(|e| e.to_string())?;

    let response = client.get(url).send().await.map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("non-success status: {}", response.status()));
    }

    response.text().await.map_err(|e| e.to_string())
}
