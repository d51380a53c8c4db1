use anyhow::{Context, Result};
use octocrab::Octocrab;
use tracing::{debug, info};

use crate::error::TrafficError;
use crate::models::{CloneActivity, CloneEntry, RepoId};

/// Authenticated GitHub client for the clone-traffic endpoint.
pub struct TrafficClient {
    client: Octocrab,
}

impl TrafficClient {
    pub fn new(token: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .context("Failed to build GitHub client")?;

        Ok(Self { client })
    }

    #[cfg(test)]
    fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(base_uri)
            .context("Failed to parse base URL")?
            .build()
            .context("Failed to build GitHub client")?;

        Ok(Self { client })
    }

    /// Verify the token by fetching the authenticated user.
    /// Authentication failure is fatal for the whole run.
    pub async fn verify_auth(&self) -> Result<()> {
        let user = self
            .client
            .current()
            .user()
            .await
            .context("GitHub authentication failed")?;

        info!(login = %user.login, "Authenticated to GitHub");
        Ok(())
    }

    /// Fetch the most recent complete day of clone traffic for one repository.
    ///
    /// Returns `Ok(None)` when the API reports no clone entries at all, which
    /// is distinct from a failed call. The traffic endpoint requires push
    /// access; missing permission surfaces as [`TrafficError::PermissionDenied`].
    pub async fn latest_clone_traffic(
        &self,
        repo: &RepoId,
    ) -> Result<Option<CloneEntry>, TrafficError> {
        let route = format!("/repos/{}/{}/traffic/clones", repo.owner, repo.name);
        debug!(repo = %repo, route = %route, "Fetching clone traffic");

        let activity: CloneActivity = self
            .client
            .get(&route, None::<&()>)
            .await
            .map_err(|e| classify_api_error(repo, e))?;

        debug!(
            repo = %repo,
            window_count = activity.count,
            window_uniques = activity.uniques,
            days = activity.clones.len(),
            "Clone traffic received"
        );

        // Only the last entry is a complete day; earlier entries were
        // captured by previous runs.
        Ok(activity.clones.into_iter().next_back())
    }
}

fn classify_api_error(repo: &RepoId, err: octocrab::Error) -> TrafficError {
    match err {
        octocrab::Error::GitHub { source, .. } => match source.status_code.as_u16() {
            403 => TrafficError::PermissionDenied(repo.full_name()),
            404 => TrafficError::NotFound(repo.full_name()),
            _ => TrafficError::Api {
                repo: repo.full_name(),
                message: source.message,
            },
        },
        other => TrafficError::Api {
            repo: repo.full_name(),
            message: other.to_string(),
        },
    }
}
