//! GitHub API error taxonomy.
//!
//! Every request outcome other than success maps onto one of these
//! variants; the orchestrator decides continue/skip/abort, so nothing here
//! retries or panics.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubError {
    /// HTTP 403 from a list/detail endpoint or GraphQL surface.
    #[error("rate limited")]
    RateLimited,

    /// HTTP 404: the referenced resource does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// HTTP 401: the bearer credential was rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// Any other non-success status.
    #[error("API error: status {status} for {resource}")]
    Api { status: u16, resource: String },

    /// Network-level failure (timeout, DNS, connection reset). Not retried
    /// at this layer.
    #[error("network error: {message}")]
    Network { message: String },

    /// Malformed payload or other unexpected condition.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl GithubError {
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    #[inline]
    pub fn api(status: u16, resource: impl Into<String>) -> Self {
        Self::Api {
            status,
            resource: resource.into(),
        }
    }

    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for the one retryable classification.
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limited_is_retryable() {
        assert!(GithubError::RateLimited.is_rate_limited());
        assert!(!GithubError::Unauthorized.is_rate_limited());
        assert!(!GithubError::not_found("repo: acme/widget").is_rate_limited());
        assert!(!GithubError::network("timeout").is_rate_limited());
        assert!(!GithubError::api(500, "/repos/acme/widget").is_rate_limited());
    }

    #[test]
    fn messages_name_the_resource() {
        let err = GithubError::not_found("user: carol");
        assert_eq!(err.to_string(), "not found: user: carol");

        let err = GithubError::api(502, "/orgs/acme/repos");
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("/orgs/acme/repos"));
    }
}
