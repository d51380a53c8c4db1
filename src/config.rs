use anyhow::{Context, Result};
use std::env;

/// Default document scraped for the list of tracked repositories.
pub const ECOSYSTEM_README_URL: &str =
    "https://raw.githubusercontent.com/ronniross/asi-ecosystem/main/README.md";

/// Environment variables that may carry the GitHub token, in lookup order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "TRAFFIC_TRACKER"];

/// Resolve the GitHub token from the environment.
///
/// Absence is fatal for a collection run; the doctor uses [`token_present`]
/// to report the same condition without failing.
pub fn github_token() -> Result<String> {
    token_from_env().with_context(|| {
        format!(
            "{} or {} environment variable is not set",
            TOKEN_ENV_VARS[0], TOKEN_ENV_VARS[1]
        )
    })
}

/// Whether any token variable is set, for diagnostics.
pub fn token_present() -> bool {
    token_from_env().is_some()
}

fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .find_map(|key| env::var(key).ok().filter(|value| !value.is_empty()))
}
