//! Commit-count estimation from pagination metadata.
//!
//! A full commit enumeration would cost O(commits) requests; instead one
//! page-size-1 request is made and the `rel="last"` page number is read off
//! the `Link` header. With one commit per page, the last page number is the
//! commit count. Repositories small enough to fit one page carry no `Link`
//! header, so the single page's length (0 or 1) is returned instead. The
//! count is always an estimate, never an exact enumeration.

use serde_json::Value;

use super::client::GithubClient;
use super::error::GithubError;

impl GithubClient {
    /// Approximate total commit count for `owner/name`.
    pub async fn estimate_commit_count(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<u64, GithubError> {
        let route = format!("/repos/{owner}/{name}/commits?per_page=1");
        let fetched = self.get_json::<Vec<Value>>(&route).await?;

        if let Some(last_page) = fetched.pagination.last_page {
            return Ok(u64::from(last_page));
        }

        Ok(fetched.data.len() as u64)
    }
}
