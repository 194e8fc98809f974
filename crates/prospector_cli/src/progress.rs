//! Progress rendering.
//!
//! The crawl's user-visible surface is log lines: every progress event and
//! failure category comes through here as structured tracing output.

use prospector::crawl::CrawlProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: CrawlProgress) {
        match event {
            CrawlProgress::ResolvingRepo { reference } => {
                tracing::info!(reference = %reference, "Resolving repository");
            }

            CrawlProgress::RepoResolved {
                reference,
                stars,
                commits,
            } => {
                tracing::info!(reference = %reference, stars, commits, "Repository resolved");
            }

            CrawlProgress::OrgFallback { org } => {
                tracing::warn!(org = %org, "Direct resolution failed, trying organization fallback");
            }

            CrawlProgress::FetchedPage {
                context,
                page,
                count,
                total_so_far,
            } => {
                tracing::debug!(context = %context, page, count, total_so_far, "Fetched page");
            }

            CrawlProgress::ContributorsListed { reference, count } => {
                tracing::info!(reference = %reference, count, "Contributors listed");
            }

            CrawlProgress::ExpandingUser { login, following } => {
                tracing::debug!(login = %login, following, "Merged following list");
            }

            CrawlProgress::WorkingSetReady { users } => {
                tracing::info!(users, "Working set ready");
            }

            CrawlProgress::UserSkipped { login, reason } => {
                tracing::warn!(login = %login, reason = %reason, "Skipped user");
            }

            CrawlProgress::UserProcessed { login, discovered } => {
                tracing::info!(login = %login, discovered, "Processed user");
            }

            CrawlProgress::RateLimitBackoff {
                context,
                retry_after_ms,
                attempt,
            } => {
                tracing::warn!(context = %context, retry_after_ms, attempt, "Rate limited, backing off");
            }

            CrawlProgress::CrawlComplete {
                contributors,
                users,
                queued,
            } => {
                tracing::info!(contributors, users, queued, "Crawl complete");
            }

            _ => {
                tracing::debug!(?event, "Progress");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_handles_every_event_shape() {
        let reporter = LoggingReporter::new();
        reporter.handle(CrawlProgress::ResolvingRepo {
            reference: "acme/widget".to_string(),
        });
        reporter.handle(CrawlProgress::CrawlComplete {
            contributors: 2,
            users: 3,
            queued: 2,
        });
        reporter.handle(CrawlProgress::UserSkipped {
            login: "carol".to_string(),
            reason: "missing discovery payload".to_string(),
        });
    }
}
