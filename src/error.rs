use thiserror::Error;

/// Failures from the clone-traffic endpoint, classified so the collector can
/// report them per repository without aborting the run.
#[derive(Error, Debug)]
pub enum TrafficError {
    #[error("push access required for {0}")]
    PermissionDenied(String),

    #[error("repository not found: {0}")]
    NotFound(String),

    #[error("GitHub API error for {repo}: {message}")]
    Api { repo: String, message: String },
}
