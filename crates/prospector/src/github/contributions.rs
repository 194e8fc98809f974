//! Windowed aggregation of commit-contribution statistics.
//!
//! The GraphQL `contributionsCollection` field caps any single query's range
//! at one year. The total since registration is therefore assembled by
//! tiling `[registration, now]` into contiguous, non-overlapping windows of
//! at most one year, walked backward from "now". A failed window is logged
//! and contributes zero; only an unresolvable registration date fails the
//! aggregation as a whole.

use chrono::{DateTime, Months, SecondsFormat, Utc};
use serde_json::json;

use super::client::GithubClient;
use super::error::GithubError;
use super::types::{UserContributions, UserCreatedAt, UserData};

const REGISTRATION_QUERY: &str = "\
query($login: String!) {
  user(login: $login) {
    createdAt
  }
}";

const CONTRIBUTIONS_QUERY: &str = "\
query($login: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $login) {
    contributionsCollection(from: $from, to: $to) {
      totalCommitContributions
    }
  }
}";

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl GithubClient {
    /// The user's registration timestamp.
    pub async fn registration_date(&self, login: &str) -> Result<DateTime<Utc>, GithubError> {
        let resource = format!("user: {login}");
        let data: UserData<UserCreatedAt> = self
            .graphql(REGISTRATION_QUERY, json!({ "login": login }), &resource)
            .await?;

        data.user
            .map(|u| u.created_at)
            .ok_or_else(|| GithubError::not_found(resource))
    }

    /// Commit contributions over an explicit `[from, to]` range (≤ 1 year).
    pub async fn commit_contributions(
        &self,
        login: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, GithubError> {
        let resource = format!("user: {login}");
        let data: UserData<UserContributions> = self
            .graphql(
                CONTRIBUTIONS_QUERY,
                json!({ "login": login, "from": iso(from), "to": iso(to) }),
                &resource,
            )
            .await?;

        data.user
            .map(|u| u.contributions_collection.total_commit_contributions)
            .ok_or_else(|| GithubError::not_found(resource))
    }

    /// Total commit contributions from registration up to `now`.
    ///
    /// `now` is an explicit input so the window layout is deterministic for
    /// callers and tests alike.
    pub async fn total_commit_contributions(
        &self,
        login: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, GithubError> {
        let registration = self.registration_date(login).await?;

        let mut current = now;
        let mut total = 0u64;

        while current > registration {
            let mut start = current
                .checked_sub_months(Months::new(12))
                .unwrap_or(registration);
            if start < registration {
                start = registration;
            }

            match self.commit_contributions(login, start, current).await {
                Ok(commits) => {
                    total += commits;
                    tracing::debug!(
                        "commits for {} from {} to {}: {}",
                        login,
                        iso(start),
                        iso(current),
                        commits
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "window query for {} from {} to {} failed, counting zero: {}",
                        login,
                        iso(start),
                        iso(current),
                        e
                    );
                }
            }

            current = start;
        }

        Ok(total)
    }
}
