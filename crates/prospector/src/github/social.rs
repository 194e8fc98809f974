//! API-backed collaborator implementations.
//!
//! The engine only knows the traits in [`crate::crawl::collaborators`];
//! these implementations back them with the same [`GithubClient`] the rest
//! of the crawl uses, so the credential and pacing configuration stay
//! process-wide.

use async_trait::async_trait;
use chrono::{Days, SecondsFormat, Utc};
use serde_json::json;

use crate::crawl::collaborators::{
    ActivityFetcher, CollaboratorError, FollowingFetcher, RecentActivity,
};

use super::client::GithubClient;
use super::pagination::ListRoute;
use super::types::{FollowedUser, UserData, UserRecentActivity};

/// How far back the recent-activity query looks.
const RECENT_ACTIVITY_DAYS: u64 = 30;

const RECENT_ACTIVITY_QUERY: &str = "\
query($login: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $login) {
    contributionsCollection(from: $from, to: $to) {
      totalCommitContributions
      commitContributionsByRepository(maxRepositories: 25) {
        repository {
          nameWithOwner
          url
          stargazerCount
        }
        contributions {
          totalCount
        }
      }
    }
  }
}";

/// Following-list fetcher over `GET /users/{login}/following`.
#[derive(Clone)]
pub struct GithubFollowingFetcher {
    client: GithubClient,
}

impl GithubFollowingFetcher {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FollowingFetcher for GithubFollowingFetcher {
    async fn following(&self, login: &str) -> Result<Vec<String>, CollaboratorError> {
        let route = ListRoute::following(login);
        let followed: Vec<FollowedUser> = self.client.list_all_pages(&route, None).await;
        Ok(followed.into_iter().map(|u| u.login).collect())
    }
}

/// 30-day activity fetcher over the GraphQL statistics surface.
#[derive(Clone)]
pub struct GithubActivityFetcher {
    client: GithubClient,
}

impl GithubActivityFetcher {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ActivityFetcher for GithubActivityFetcher {
    async fn recent_activity(&self, login: &str) -> Result<RecentActivity, CollaboratorError> {
        let to = Utc::now();
        let from = to
            .checked_sub_days(Days::new(RECENT_ACTIVITY_DAYS))
            .unwrap_or(to);

        let resource = format!("user: {login}");
        let data: UserData<UserRecentActivity> = self
            .client
            .graphql(
                RECENT_ACTIVITY_QUERY,
                json!({
                    "login": login,
                    "from": from.to_rfc3339_opts(SecondsFormat::Secs, true),
                    "to": to.to_rfc3339_opts(SecondsFormat::Secs, true),
                }),
                &resource,
            )
            .await
            .map_err(|e| CollaboratorError::new(e.to_string()))?;

        let user = data
            .user
            .ok_or_else(|| CollaboratorError::new(format!("no such user: {login}")))?;

        // An empty repository list carries no discovery value; treat it the
        // same as an absent payload so the engine skips the user.
        let discovered = user
            .contributions_collection
            .commit_contributions_by_repository
            .filter(|v| !v.as_array().is_some_and(Vec::is_empty));

        Ok(RecentActivity {
            total: user.contributions_collection.total_commit_contributions,
            profile_link: format!("https://github.com/{login}"),
            discovered,
        })
    }
}
