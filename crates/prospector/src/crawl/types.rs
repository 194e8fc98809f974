//! Crawl options, report, and error types.

use thiserror::Error;

use crate::github::GithubError;
use crate::reference::ReferenceError;

/// Options for a crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Compute each processed user's lifetime commit total via the windowed
    /// statistics aggregation and attach it to the user record.
    pub aggregate_lifetime_commits: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            aggregate_lifetime_commits: true,
        }
    }
}

/// Outcome of a completed crawl.
#[derive(Debug, Default)]
pub struct CrawlReport {
    /// The reference that was actually crawled (post-fallback).
    pub reference: String,
    /// Whether resolution went through the organization fallback.
    pub used_org_fallback: bool,
    /// Contributors listed for the root repository.
    pub contributors: usize,
    /// Users whose activity was processed to completion.
    pub users_processed: usize,
    /// Users skipped (failed fetch or missing discovery payload).
    pub users_skipped: usize,
    /// Discovered-repo payloads forwarded to the queue.
    pub repos_queued: usize,
    /// Non-fatal failures encountered along the way.
    pub errors: Vec<String>,
}

/// Terminal crawl failures. Everything else is logged and accumulated on
/// the report instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The input reference was rejected before any network call.
    #[error(transparent)]
    InvalidReference(#[from] ReferenceError),

    /// Direct resolution and the organization fallback both failed.
    #[error("failed to resolve {reference}: {source}")]
    Resolution {
        reference: String,
        #[source]
        source: GithubError,
    },

    /// The organization fallback itself failed.
    #[error("org fallback for {org} failed: {source}")]
    OrgFallback {
        org: String,
        #[source]
        source: GithubError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_aggregate_lifetime_commits() {
        assert!(CrawlOptions::default().aggregate_lifetime_commits);
    }

    #[test]
    fn report_default_is_empty() {
        let report = CrawlReport::default();
        assert_eq!(report.contributors, 0);
        assert_eq!(report.users_processed, 0);
        assert_eq!(report.repos_queued, 0);
        assert!(report.errors.is_empty());
        assert!(!report.used_org_fallback);
    }

    #[test]
    fn invalid_reference_error_is_transparent() {
        let err = CrawlError::from(ReferenceError::Invalid("???".to_string()));
        assert!(err.to_string().contains("???"));
    }

    #[test]
    fn resolution_error_names_the_reference() {
        let err = CrawlError::Resolution {
            reference: "acme/widget".to_string(),
            source: GithubError::Unauthorized,
        };
        assert!(err.to_string().contains("acme/widget"));
    }
}
