use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ECOSYSTEM_README_URL;

/// Daily GitHub clone traffic collector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// URL of the ecosystem document listing tracked repositories
    #[arg(long, env = "ECOSYSTEM_URL", default_value = ECOSYSTEM_README_URL)]
    pub ecosystem_url: String,

    /// Root directory holding per-repository state
    #[arg(long, env = "BASE_DIR", default_value = "repos")]
    pub base_dir: PathBuf,

    /// Path of the cross-repository summary file
    #[arg(long, env = "GLOBAL_SUMMARY_FILE", default_value = "global-summary.json")]
    pub global_summary_file: PathBuf,

    /// Timeout for the ecosystem document fetch in seconds
    #[arg(long, env = "FETCH_TIMEOUT", default_value = "30")]
    pub fetch_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log format (pretty, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect today's clone statistics for every tracked repository (default)
    Collect,
    /// Verify credentials, connectivity, and project files
    Doctor,
}
