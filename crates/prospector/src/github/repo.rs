//! Repository resolution.
//!
//! Resolution turns `(owner, name)` into [`RepoMetadata`] via the detail
//! endpoint, retrying rate-limit classifications under the client's bounded
//! backoff policy. Any other failure surfaces immediately; the org-level
//! fallback belongs to the orchestrator, which uses this as a primitive.

use chrono::{DateTime, Utc};

use crate::crawl::{CrawlProgress, ProgressCallback, emit};
use crate::retry::with_retry;

use super::client::GithubClient;
use super::error::GithubError;
use super::types::RepoDetails;

/// Resolved repository metadata.
///
/// Built in one piece per resolution attempt; `commit_count` is always an
/// estimate (see [`GithubClient::estimate_commit_count`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMetadata {
    pub stars: u64,
    pub commit_count: u64,
    pub created_at: DateTime<Utc>,
}

impl GithubClient {
    /// Resolve `owner/name` to metadata.
    ///
    /// Rate-limit responses are retried with exponential backoff up to the
    /// configured attempt ceiling; each backoff suspends the whole crawl. A
    /// failed commit estimate degrades to zero rather than failing the
    /// resolution.
    pub async fn resolve_repo(
        &self,
        owner: &str,
        name: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<RepoMetadata, GithubError> {
        let route = format!("/repos/{owner}/{name}");
        let context = format!("{owner}/{name}");

        emit(
            on_progress,
            CrawlProgress::ResolvingRepo {
                reference: context.clone(),
            },
        );

        let retry = self.retry_config().clone();
        let client = self.clone();
        let fetched = with_retry(
            || {
                let client = client.clone();
                let route = route.clone();
                async move { client.get_json::<RepoDetails>(&route).await }
            },
            GithubError::is_rate_limited,
            &retry,
            &context,
            on_progress,
        )
        .await?;

        let commit_count = match self.estimate_commit_count(owner, name).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("commit estimate for {} failed, counting zero: {}", context, e);
                0
            }
        };

        let metadata = RepoMetadata {
            stars: fetched.data.stargazers_count,
            commit_count,
            created_at: fetched.data.created_at,
        };

        emit(
            on_progress,
            CrawlProgress::RepoResolved {
                reference: context,
                stars: metadata.stars,
                commits: metadata.commit_count,
            },
        );

        Ok(metadata)
    }
}
