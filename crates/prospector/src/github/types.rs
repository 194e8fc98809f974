//! Wire payload types for both API surfaces.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Repository detail payload (`GET /repos/{owner}/{name}`).
#[derive(Debug, Clone, Deserialize)]
pub struct RepoDetails {
    pub stargazers_count: u64,
    pub created_at: DateTime<Utc>,
}

/// One entry of the contributors list.
///
/// The raw upstream payload is retained alongside the login so downstream
/// consumers see exactly what the API returned.
#[derive(Debug, Clone)]
pub struct Contributor {
    pub login: String,
    pub raw: Value,
}

impl Contributor {
    /// Extract contributors from raw list-endpoint items, dropping entries
    /// without a login (e.g. anonymous contributors).
    pub fn from_items(items: Vec<Value>) -> Vec<Self> {
        items
            .into_iter()
            .filter_map(|raw| {
                let login = raw.get("login")?.as_str()?.to_string();
                Some(Self { login, raw })
            })
            .collect()
    }
}

/// One entry of an organization's repository list, as consumed by the
/// resolution fallback (only the first entry is ever used).
#[derive(Debug, Clone, Deserialize)]
pub struct OrgRepoSummary {
    pub name: String,
    pub owner: OrgRepoOwner,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrgRepoOwner {
    pub login: String,
}

/// One entry of a following list (`GET /users/{login}/following`).
#[derive(Debug, Clone, Deserialize)]
pub struct FollowedUser {
    pub login: String,
}

// ---------- GraphQL response shells ----------

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphqlEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserData<U> {
    pub user: Option<U>,
}

/// `user { createdAt }`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreatedAt {
    pub created_at: DateTime<Utc>,
}

/// `user { contributionsCollection { totalCommitContributions } }`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContributions {
    pub contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub total_commit_contributions: u64,
}

/// The 30-day activity shape: `user { contributionsCollection {
/// totalCommitContributions, commitContributionsByRepository { ... } } }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecentActivity {
    pub contributions_collection: RecentContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentContributionsCollection {
    pub total_commit_contributions: u64,
    /// Nested discovery payload; kept raw so the queue receives exactly what
    /// the API returned.
    #[serde(default)]
    pub commit_contributions_by_repository: Option<Value>,
}
