//! The crawl state machine.
//!
//! `ResolvingRepo → (OrgFallback)? → ListingContributors → ExpandingUsers →
//! ProcessingActivity → Done`, with `Failed` reachable from the two
//! resolution states. Each state carries exactly the data its transition
//! needs; the transition functions live in [`super::engine`].

use crate::github::{Contributor, GithubError, RepoMetadata};
use crate::reference::RepoReference;

use super::types::CrawlError;

/// One state of the crawl.
#[derive(Debug)]
pub enum CrawlState {
    /// Resolving the root reference to metadata.
    ResolvingRepo { reference: RepoReference },

    /// Direct resolution failed; retrying against the owning organization's
    /// first listed repository.
    OrgFallback {
        /// The reference that failed direct resolution.
        failed: RepoReference,
        /// Why it failed, kept for the terminal error if the fallback also
        /// fails.
        error: GithubError,
    },

    /// Listing contributors for the resolved repository.
    ListingContributors {
        reference: RepoReference,
        metadata: RepoMetadata,
    },

    /// Unioning contributors with their following lists.
    ExpandingUsers { contributors: Vec<Contributor> },

    /// Fetching per-user activity and forwarding discoveries.
    ProcessingActivity { users: Vec<String> },

    /// Terminal: the crawl completed.
    Done,

    /// Terminal: the crawl aborted.
    Failed(CrawlError),
}

impl CrawlState {
    /// State name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CrawlState::ResolvingRepo { .. } => "resolving-repo",
            CrawlState::OrgFallback { .. } => "org-fallback",
            CrawlState::ListingContributors { .. } => "listing-contributors",
            CrawlState::ExpandingUsers { .. } => "expanding-users",
            CrawlState::ProcessingActivity { .. } => "processing-activity",
            CrawlState::Done => "done",
            CrawlState::Failed(_) => "failed",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, CrawlState::Done | CrawlState::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceError;

    #[test]
    fn terminal_states_are_done_and_failed() {
        assert!(CrawlState::Done.is_terminal());
        assert!(
            CrawlState::Failed(CrawlError::InvalidReference(ReferenceError::Invalid(
                "x".to_string()
            )))
            .is_terminal()
        );

        let state = CrawlState::ResolvingRepo {
            reference: RepoReference::new("acme", "widget"),
        };
        assert!(!state.is_terminal());
    }

    #[test]
    fn names_match_states() {
        let state = CrawlState::ProcessingActivity { users: Vec::new() };
        assert_eq!(state.name(), "processing-activity");
        assert_eq!(CrawlState::Done.name(), "done");
    }
}
