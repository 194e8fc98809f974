//! External collaborator boundaries.
//!
//! Persistent storage, the social-graph fetcher, the 30-day activity
//! fetcher, and the downstream crawl queue are I/O boundaries the engine
//! consumes, not machinery it owns. Each is a trait; the CLI wires file
//! backed implementations, and the github module provides API-backed ones
//! for the two fetchers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure inside a collaborator. The engine treats these as non-fatal:
/// logged, counted, and the traversal continues.
#[derive(Debug, Error)]
#[error("collaborator error: {0}")]
pub struct CollaboratorError(pub String);

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Repository record upserted once per crawl, keyed by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    /// Browse URL; the store's conflict key.
    pub url: String,
    pub contributors: u64,
    pub stars: u64,
    pub commits: u64,
    pub created_at: DateTime<Utc>,
    /// When this crawl touched the record.
    pub last_request: DateTime<Utc>,
}

/// User record upserted per processed user, keyed by profile link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable social-profile link; the store's conflict key.
    pub github_link: String,
    pub login: String,
    /// Commit contributions over the trailing 30 days.
    pub contributions_last_30_days: u64,
    /// Commit contributions since registration, when the aggregation
    /// succeeded.
    pub lifetime_commits: Option<u64>,
}

/// Result of the 30-day activity fetch for one user.
#[derive(Debug, Clone)]
pub struct RecentActivity {
    /// Commit contributions over the trailing 30 days.
    pub total: u64,
    /// The user's profile link.
    pub profile_link: String,
    /// Nested discovered-repository payload, absent for users without
    /// repository-linked contributions.
    pub discovered: Option<Value>,
}

/// A discovered repository bound for the crawl queue. Created transiently
/// per processed user, handed off, then dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredRepo {
    /// The user whose activity surfaced this repository.
    pub login: String,
    /// The raw upstream payload describing the repository.
    pub payload: Value,
}

/// Idempotent last-write-wins storage of repository and user records.
#[async_trait]
pub trait ContributionStore: Send + Sync {
    async fn upsert_repo(&self, record: RepoRecord) -> Result<(), CollaboratorError>;
    async fn upsert_user(&self, record: UserRecord) -> Result<(), CollaboratorError>;
}

/// Social-graph neighbor fetcher: who does `login` follow?
#[async_trait]
pub trait FollowingFetcher: Send + Sync {
    async fn following(&self, login: &str) -> Result<Vec<String>, CollaboratorError>;
}

/// 30-day activity fetcher.
#[async_trait]
pub trait ActivityFetcher: Send + Sync {
    async fn recent_activity(&self, login: &str) -> Result<RecentActivity, CollaboratorError>;
}

/// Downstream crawl-queue writer; no ordering is assumed.
#[async_trait]
pub trait DiscoveryQueue: Send + Sync {
    async fn push(&self, repo: DiscoveredRepo) -> Result<(), CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_round_trip_through_json() {
        let record = RepoRecord {
            url: "https://github.com/acme/widget".to_string(),
            contributors: 2,
            stars: 55,
            commits: 420,
            created_at: "2018-03-01T09:30:00Z".parse().unwrap(),
            last_request: "2024-06-01T00:00:00Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["url"], "https://github.com/acme/widget");
        let back: RepoRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn user_record_lifetime_commits_is_optional() {
        let record = UserRecord {
            github_link: "https://github.com/alice".to_string(),
            login: "alice".to_string(),
            contributions_last_30_days: 12,
            lifetime_commits: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["lifetime_commits"].is_null());
    }

    #[test]
    fn discovered_repo_keeps_the_raw_payload() {
        let repo = DiscoveredRepo {
            login: "alice".to_string(),
            payload: json!({"repository": {"nameWithOwner": "acme/gadget"}}),
        };
        assert_eq!(repo.payload["repository"]["nameWithOwner"], "acme/gadget");
    }
}
