//! Crawl context builder.
//!
//! Bundles the client, the four collaborators, options, and the progress
//! callback so the engine takes one argument instead of seven.
//!
//! # Example
//!
//! ```ignore
//! use prospector::crawl::{CrawlContext, CrawlOptions};
//!
//! let ctx = CrawlContext::builder()
//!     .client(client)
//!     .store(store)
//!     .following(following)
//!     .activity(activity)
//!     .queue(queue)
//!     .build()?;
//!
//! let report = ctx.crawl("acme/widget").await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::github::GithubClient;

use super::collaborators::{ActivityFetcher, ContributionStore, DiscoveryQueue, FollowingFetcher};
use super::engine;
use super::progress::ProgressCallback;
use super::types::{CrawlError, CrawlOptions, CrawlReport};

/// Error building a crawl context.
#[derive(Debug, thiserror::Error)]
pub enum CrawlContextError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

/// Builder for [`CrawlContext`].
#[derive(Default)]
pub struct CrawlContextBuilder {
    client: Option<GithubClient>,
    store: Option<Arc<dyn ContributionStore>>,
    following: Option<Arc<dyn FollowingFetcher>>,
    activity: Option<Arc<dyn ActivityFetcher>>,
    queue: Option<Arc<dyn DiscoveryQueue>>,
    options: Option<CrawlOptions>,
    progress: Option<Arc<ProgressCallback>>,
}

impl CrawlContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(mut self, client: GithubClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn store(mut self, store: Arc<dyn ContributionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn following(mut self, following: Arc<dyn FollowingFetcher>) -> Self {
        self.following = Some(following);
        self
    }

    pub fn activity(mut self, activity: Arc<dyn ActivityFetcher>) -> Self {
        self.activity = Some(activity);
        self
    }

    pub fn queue(mut self, queue: Arc<dyn DiscoveryQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn options(mut self, options: CrawlOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn progress(mut self, callback: Arc<ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Build the context.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlContextError::MissingField`] when the client or any
    /// collaborator is absent.
    pub fn build(self) -> Result<CrawlContext, CrawlContextError> {
        Ok(CrawlContext {
            client: self
                .client
                .ok_or(CrawlContextError::MissingField { field: "client" })?,
            store: self
                .store
                .ok_or(CrawlContextError::MissingField { field: "store" })?,
            following: self
                .following
                .ok_or(CrawlContextError::MissingField { field: "following" })?,
            activity: self
                .activity
                .ok_or(CrawlContextError::MissingField { field: "activity" })?,
            queue: self
                .queue
                .ok_or(CrawlContextError::MissingField { field: "queue" })?,
            options: self.options.unwrap_or_default(),
            progress: self.progress,
        })
    }
}

/// Everything a crawl needs, in one place.
pub struct CrawlContext {
    client: GithubClient,
    store: Arc<dyn ContributionStore>,
    following: Arc<dyn FollowingFetcher>,
    activity: Arc<dyn ActivityFetcher>,
    queue: Arc<dyn DiscoveryQueue>,
    options: CrawlOptions,
    progress: Option<Arc<ProgressCallback>>,
}

impl std::fmt::Debug for CrawlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlContext")
            .field("options", &self.options)
            .field("has_progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl CrawlContext {
    pub fn builder() -> CrawlContextBuilder {
        CrawlContextBuilder::new()
    }

    pub fn client(&self) -> &GithubClient {
        &self.client
    }

    pub fn store(&self) -> &dyn ContributionStore {
        self.store.as_ref()
    }

    pub fn following(&self) -> &dyn FollowingFetcher {
        self.following.as_ref()
    }

    pub fn activity(&self) -> &dyn ActivityFetcher {
        self.activity.as_ref()
    }

    pub fn queue(&self) -> &dyn DiscoveryQueue {
        self.queue.as_ref()
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    pub fn progress_callback(&self) -> Option<&ProgressCallback> {
        self.progress.as_ref().map(|p| p.as_ref())
    }

    /// Crawl the graph rooted at `input`, with "now" taken from the clock.
    pub async fn crawl(&self, input: &str) -> Result<CrawlReport, CrawlError> {
        engine::crawl_at(self, input, Utc::now()).await
    }

    /// Crawl with an explicit "now", pinning the windowed aggregation and
    /// record timestamps for deterministic runs.
    pub async fn crawl_at(
        &self,
        input: &str,
        now: DateTime<Utc>,
    ) -> Result<CrawlReport, CrawlError> {
        engine::crawl_at(self, input, now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_client_and_collaborators() {
        let err = CrawlContextBuilder::new().build().unwrap_err();
        match err {
            CrawlContextError::MissingField { field } => assert_eq!(field, "client"),
        }
    }

    #[test]
    fn missing_field_error_display() {
        let err = CrawlContextError::MissingField { field: "queue" };
        assert!(err.to_string().contains("queue"));
    }
}
