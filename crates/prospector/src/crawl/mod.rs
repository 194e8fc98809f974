//! The crawl engine.
//!
//! # Module Structure
//!
//! - [`types`] - `CrawlOptions`, `CrawlReport`, `CrawlError`
//! - [`progress`] - `CrawlProgress`, `ProgressCallback`, `emit()`
//! - [`collaborators`] - external boundary traits and record types
//! - [`state`] - the explicit crawl state machine
//! - [`engine`] - per-state transition functions
//! - [`context`] - `CrawlContext` builder tying it all together

pub mod collaborators;
mod context;
mod engine;
mod progress;
mod state;
mod types;

pub use collaborators::{
    ActivityFetcher, CollaboratorError, ContributionStore, DiscoveredRepo, DiscoveryQueue,
    FollowingFetcher, RecentActivity, RepoRecord, UserRecord,
};
pub use context::{CrawlContext, CrawlContextBuilder, CrawlContextError};
pub use progress::{CrawlProgress, ProgressCallback, emit};
pub use state::CrawlState;
pub use types::{CrawlError, CrawlOptions, CrawlReport};
