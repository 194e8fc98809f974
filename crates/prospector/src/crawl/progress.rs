//! Progress reporting for crawl operations.
//!
//! Every failure category in the error taxonomy is observable either as an
//! event here or as a tracing log line; the CLI renders these for the user.

/// Progress events emitted during a crawl.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum CrawlProgress {
    /// Starting to resolve the root repository.
    ResolvingRepo {
        /// The `owner/name` reference being resolved.
        reference: String,
    },

    /// The root repository resolved to metadata.
    RepoResolved {
        reference: String,
        stars: u64,
        commits: u64,
    },

    /// Direct resolution failed; falling back to the owning organization.
    OrgFallback {
        /// The organization whose repositories are being listed.
        org: String,
    },

    /// Fetched one page of a list endpoint.
    FetchedPage {
        /// What is being listed (e.g. `acme/widget contributors`).
        context: String,
        /// Page number (1-indexed).
        page: u32,
        /// Items on this page.
        count: usize,
        /// Running total across pages.
        total_so_far: usize,
    },

    /// Contributor listing finished.
    ContributorsListed { reference: String, count: usize },

    /// A contributor's following list was merged into the working set.
    ExpandingUser {
        login: String,
        /// Size of the following list fetched for this contributor.
        following: usize,
    },

    /// The deduplicated working set is ready for activity processing.
    WorkingSetReady { users: usize },

    /// A user was skipped (missing activity or discovery payload).
    UserSkipped { login: String, reason: String },

    /// A user's activity was processed and payloads forwarded.
    UserProcessed {
        login: String,
        /// Number of discovered-repo payloads forwarded to the queue.
        discovered: usize,
    },

    /// Sleeping before retrying a rate-limited request.
    RateLimitBackoff {
        /// What request is being retried.
        context: String,
        /// Delay before the next attempt.
        retry_after_ms: u64,
        /// Attempt number that just failed (1-indexed).
        attempt: u32,
    },

    /// The crawl reached `Done`.
    CrawlComplete {
        contributors: usize,
        users: usize,
        queued: usize,
    },
}

/// Callback for receiving progress events.
pub type ProgressCallback = Box<dyn Fn(CrawlProgress) + Send + Sync>;

/// Emit an event if a callback is attached.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: CrawlProgress) {
    if let Some(callback) = on_progress {
        callback(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_invokes_attached_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_capture = Arc::clone(&calls);

        let callback: ProgressCallback = Box::new(move |event| {
            calls_capture.fetch_add(1, Ordering::SeqCst);
            if let CrawlProgress::CrawlComplete { queued, .. } = event {
                assert_eq!(queued, 2);
            }
        });

        emit(
            Some(&callback),
            CrawlProgress::CrawlComplete {
                contributors: 2,
                users: 3,
                queued: 2,
            },
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn emit_is_a_no_op_without_callback() {
        emit(None, CrawlProgress::WorkingSetReady { users: 0 });
    }
}
