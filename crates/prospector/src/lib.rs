//! Prospector - a contribution-graph crawler for GitHub repositories.
//!
//! Starting from a repository reference, the crawler resolves metadata,
//! enumerates contributors, expands to each contributor's social
//! connections and recent activity, and forwards newly discovered
//! repositories to an external crawl queue.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use prospector::config::GithubConfig;
//! use prospector::crawl::CrawlContext;
//! use prospector::github::{GithubClient, GithubFollowingFetcher, GithubActivityFetcher};
//! use prospector::http::reqwest_transport::ReqwestTransport;
//!
//! let transport = Arc::new(ReqwestTransport::new(reqwest::Client::new()));
//! let client = GithubClient::new(GithubConfig::with_token(token), transport);
//!
//! let ctx = CrawlContext::builder()
//!     .client(client.clone())
//!     .following(Arc::new(GithubFollowingFetcher::new(client.clone())))
//!     .activity(Arc::new(GithubActivityFetcher::new(client)))
//!     .store(store)
//!     .queue(queue)
//!     .build()?;
//!
//! let report = ctx.crawl("rust-lang/cargo").await?;
//! println!("queued {} discovered repos", report.repos_queued);
//! ```

pub mod config;
pub mod crawl;
pub mod github;
pub mod http;
pub mod rate_limit;
pub mod reference;
pub mod retry;

pub use config::GithubConfig;
pub use crawl::{CrawlContext, CrawlError, CrawlOptions, CrawlProgress, CrawlReport};
pub use github::{GithubClient, GithubError, RepoMetadata};
pub use rate_limit::ApiRateLimiter;
pub use reference::{ReferenceError, RepoReference};
pub use retry::RetryConfig;
