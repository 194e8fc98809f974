//! The crawl orchestrator.
//!
//! Drives the state machine in [`super::state`]: one typed transition
//! function per state, executed strictly in sequence. Every network call is
//! a suspension point; no two API calls run concurrently, so the ordering
//! guarantees (repository before contributors, contributors before their
//! followers' activity) hold by construction.
//!
//! The orchestrator is the only component with side effects beyond
//! returning values: it upserts records into the store and forwards
//! discovered repositories to the queue. Collaborator failures are logged
//! and accumulated on the report; only invalid input and unrecoverable
//! resolution abort the crawl.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::github::{Contributor, GithubError, ListRoute, OrgRepoSummary, PAGE_SIZE, RepoMetadata};
use crate::reference::RepoReference;

use super::collaborators::{DiscoveredRepo, RepoRecord, UserRecord};
use super::context::CrawlContext;
use super::progress::{CrawlProgress, emit};
use super::state::CrawlState;
use super::types::{CrawlError, CrawlReport};

/// Run a crawl rooted at `input` with an explicit "now".
pub(super) async fn crawl_at(
    ctx: &CrawlContext,
    input: &str,
    now: DateTime<Utc>,
) -> Result<CrawlReport, CrawlError> {
    let mut report = CrawlReport::default();

    // Invalid references terminate before any network call.
    let mut state = match RepoReference::parse(input) {
        Ok(reference) => CrawlState::ResolvingRepo { reference },
        Err(e) => CrawlState::Failed(e.into()),
    };

    loop {
        tracing::debug!("crawl state: {}", state.name());

        state = match state {
            CrawlState::ResolvingRepo { reference } => resolve(ctx, reference, &mut report).await,
            CrawlState::OrgFallback { failed, error } => {
                org_fallback(ctx, failed, error, &mut report).await
            }
            CrawlState::ListingContributors {
                reference,
                metadata,
            } => list_contributors(ctx, reference, metadata, now, &mut report).await,
            CrawlState::ExpandingUsers { contributors } => {
                expand_users(ctx, contributors, &mut report).await
            }
            CrawlState::ProcessingActivity { users } => {
                process_activity(ctx, users, now, &mut report).await
            }
            CrawlState::Done => {
                emit(
                    ctx.progress_callback(),
                    CrawlProgress::CrawlComplete {
                        contributors: report.contributors,
                        users: report.users_processed,
                        queued: report.repos_queued,
                    },
                );
                return Ok(report);
            }
            CrawlState::Failed(error) => {
                tracing::error!("crawl aborted: {}", error);
                return Err(error);
            }
        };
    }
}

/// `ResolvingRepo`: direct resolution, falling to `OrgFallback` on failure.
async fn resolve(
    ctx: &CrawlContext,
    reference: RepoReference,
    report: &mut CrawlReport,
) -> CrawlState {
    report.reference = reference.to_string();

    match ctx
        .client()
        .resolve_repo(reference.owner(), reference.name(), ctx.progress_callback())
        .await
    {
        Ok(metadata) => CrawlState::ListingContributors {
            reference,
            metadata,
        },
        Err(error) => {
            tracing::warn!("direct resolution of {} failed: {}", reference, error);
            CrawlState::OrgFallback {
                failed: reference,
                error,
            }
        }
    }
}

/// `OrgFallback`: one org-list request, re-resolve against the first entry.
async fn org_fallback(
    ctx: &CrawlContext,
    failed: RepoReference,
    error: GithubError,
    report: &mut CrawlReport,
) -> CrawlState {
    let org = failed.owner().to_string();
    emit(
        ctx.progress_callback(),
        CrawlProgress::OrgFallback { org: org.clone() },
    );

    // Only the first entry is ever consumed, so one page suffices.
    let route = format!("/orgs/{org}/repos?per_page={PAGE_SIZE}&page=1");
    let fetched = match ctx.client().get_json::<Vec<OrgRepoSummary>>(&route).await {
        Ok(fetched) => fetched,
        Err(source) => {
            return CrawlState::Failed(CrawlError::OrgFallback { org, source });
        }
    };

    let Some(first) = fetched.data.into_iter().next() else {
        tracing::warn!("org {} has no repositories to fall back to", org);
        return CrawlState::Failed(CrawlError::Resolution {
            reference: failed.to_string(),
            source: error,
        });
    };

    tracing::info!("falling back from {} to {}", failed, first.html_url);
    let reference = RepoReference::new(first.owner.login, first.name);

    match ctx
        .client()
        .resolve_repo(reference.owner(), reference.name(), ctx.progress_callback())
        .await
    {
        Ok(metadata) => {
            report.used_org_fallback = true;
            report.reference = reference.to_string();
            CrawlState::ListingContributors {
                reference,
                metadata,
            }
        }
        Err(source) => CrawlState::Failed(CrawlError::Resolution {
            reference: reference.to_string(),
            source,
        }),
    }
}

/// `ListingContributors`: paginate contributors, upsert the one repo record.
async fn list_contributors(
    ctx: &CrawlContext,
    reference: RepoReference,
    metadata: RepoMetadata,
    now: DateTime<Utc>,
    report: &mut CrawlReport,
) -> CrawlState {
    let route = ListRoute::contributors(reference.owner(), reference.name());
    let items: Vec<Value> = ctx
        .client()
        .list_all_pages(&route, ctx.progress_callback())
        .await;
    let contributors = Contributor::from_items(items);
    report.contributors = contributors.len();

    emit(
        ctx.progress_callback(),
        CrawlProgress::ContributorsListed {
            reference: reference.to_string(),
            count: contributors.len(),
        },
    );

    let record = RepoRecord {
        url: reference.html_url(),
        contributors: contributors.len() as u64,
        stars: metadata.stars,
        commits: metadata.commit_count,
        created_at: metadata.created_at,
        last_request: now,
    };
    if let Err(e) = ctx.store().upsert_repo(record).await {
        tracing::warn!("repo upsert for {} failed: {}", reference, e);
        report.errors.push(format!("repo upsert for {reference}: {e}"));
    }

    CrawlState::ExpandingUsers { contributors }
}

/// `ExpandingUsers`: union contributors with their following lists into an
/// insertion-ordered working set keyed by login. A user reached through two
/// contributors is processed once.
async fn expand_users(
    ctx: &CrawlContext,
    contributors: Vec<Contributor>,
    report: &mut CrawlReport,
) -> CrawlState {
    let mut seen: HashSet<String> = HashSet::new();
    let mut users: Vec<String> = Vec::new();

    for contributor in &contributors {
        if seen.insert(contributor.login.clone()) {
            users.push(contributor.login.clone());
        }
    }

    for contributor in &contributors {
        match ctx.following().following(&contributor.login).await {
            Ok(followed) => {
                emit(
                    ctx.progress_callback(),
                    CrawlProgress::ExpandingUser {
                        login: contributor.login.clone(),
                        following: followed.len(),
                    },
                );
                for login in followed {
                    if seen.insert(login.clone()) {
                        users.push(login);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("following fetch for {} failed: {}", contributor.login, e);
                report
                    .errors
                    .push(format!("following fetch for {}: {e}", contributor.login));
            }
        }
    }

    emit(
        ctx.progress_callback(),
        CrawlProgress::WorkingSetReady { users: users.len() },
    );

    CrawlState::ProcessingActivity { users }
}

/// `ProcessingActivity`: per-user activity fetch, user upsert, and queue
/// forwarding. Missing activity or discovery payloads skip the user.
async fn process_activity(
    ctx: &CrawlContext,
    users: Vec<String>,
    now: DateTime<Utc>,
    report: &mut CrawlReport,
) -> CrawlState {
    for login in users {
        let activity = match ctx.activity().recent_activity(&login).await {
            Ok(activity) => activity,
            Err(e) => {
                tracing::warn!("failed to fetch contributions for {}: {}", login, e);
                emit(
                    ctx.progress_callback(),
                    CrawlProgress::UserSkipped {
                        login,
                        reason: format!("activity fetch failed: {e}"),
                    },
                );
                report.users_skipped += 1;
                continue;
            }
        };

        let Some(discovered) = activity.discovered else {
            tracing::info!(
                "skipping user {} due to missing discovery payload",
                activity.profile_link
            );
            emit(
                ctx.progress_callback(),
                CrawlProgress::UserSkipped {
                    login,
                    reason: "missing discovery payload".to_string(),
                },
            );
            report.users_skipped += 1;
            continue;
        };

        let lifetime_commits = if ctx.options().aggregate_lifetime_commits {
            match ctx.client().total_commit_contributions(&login, now).await {
                Ok(total) => Some(total),
                Err(e) => {
                    tracing::warn!("lifetime aggregation for {} failed: {}", login, e);
                    report
                        .errors
                        .push(format!("lifetime aggregation for {login}: {e}"));
                    None
                }
            }
        } else {
            None
        };

        let record = UserRecord {
            github_link: activity.profile_link.clone(),
            login: login.clone(),
            contributions_last_30_days: activity.total,
            lifetime_commits,
        };
        if let Err(e) = ctx.store().upsert_user(record).await {
            tracing::warn!("user upsert for {} failed: {}", login, e);
            report.errors.push(format!("user upsert for {login}: {e}"));
        }

        // One queue entry per discovered payload.
        let payloads: Vec<Value> = match discovered {
            Value::Array(items) => items,
            other => vec![other],
        };

        let mut queued = 0usize;
        for payload in payloads {
            let entry = DiscoveredRepo {
                login: login.clone(),
                payload,
            };
            match ctx.queue().push(entry).await {
                Ok(()) => queued += 1,
                Err(e) => {
                    tracing::warn!("queue push for {} failed: {}", login, e);
                    report.errors.push(format!("queue push for {login}: {e}"));
                }
            }
        }

        report.repos_queued += queued;
        report.users_processed += 1;
        emit(
            ctx.progress_callback(),
            CrawlProgress::UserProcessed {
                login,
                discovered: queued,
            },
        );
    }

    CrawlState::Done
}
