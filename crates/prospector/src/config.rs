//! Client configuration.
//!
//! The bearer credential and both API base URLs are explicit construction
//! inputs, passed to the client rather than read from ambient process state.

use serde::Deserialize;

/// Default REST API base URL.
pub const DEFAULT_REST_BASE_URL: &str = "https://api.github.com";

/// Default GraphQL endpoint URL.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("prospector/", env!("CARGO_PKG_VERSION"));

/// Configuration for the GitHub client: one bearer credential supplied to
/// every request on both API surfaces.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Personal access token used as the bearer credential.
    pub token: String,
    /// REST API base URL (overridable for tests and GitHub Enterprise).
    pub rest_base_url: String,
    /// GraphQL endpoint URL.
    pub graphql_url: String,
    /// User agent header value.
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            rest_base_url: DEFAULT_REST_BASE_URL.to_string(),
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GithubConfig {
    /// Config with a token and default endpoints.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }
}
