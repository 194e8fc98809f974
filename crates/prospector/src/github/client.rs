//! Request issuing and outcome classification.
//!
//! One request in, one classified outcome out. Rate-limit handling is a
//! caller concern (see [`crate::retry`]); this layer only names what
//! happened: success, rate limited, not found, unauthorized, or other.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::GithubConfig;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::rate_limit::ApiRateLimiter;
use crate::retry::RetryConfig;

use super::error::GithubError;
use super::types::GraphqlEnvelope;

/// Pagination information extracted from GitHub's `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPagination {
    /// The last page number (from `rel="last"`).
    pub last_page: Option<u32>,
    /// The next page number (from `rel="next"`).
    pub next_page: Option<u32>,
}

/// Parse a `Link` header into pagination info.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/repos/a/b/commits?per_page=1&page=2>; rel="next", <...&page=8049>; rel="last"`
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for part in link_header.split(',') {
        let part = part.trim();

        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(rel_value) = segment.strip_prefix("rel=") {
                rel = Some(rel_value.trim_matches('"'));
            }
        }

        if let (Some(url), Some(rel_type)) = (url, rel)
            && let Some(page_num) = extract_page_from_url(url)
        {
            match rel_type {
                "last" => info.last_page = Some(page_num),
                "next" => info.next_page = Some(page_num),
                _ => {}
            }
        }
    }

    info
}

/// Extract the `page` query parameter from a URL.
fn extract_page_from_url(url: &str) -> Option<u32> {
    let query_start = url.find('?')?;
    let query = &url[query_start + 1..];

    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("page=") {
            return value.parse().ok();
        }
    }

    None
}

/// A successful fetch: the payload plus pagination metadata.
#[derive(Debug)]
pub struct Fetched<T> {
    pub data: T,
    pub pagination: LinkPagination,
}

/// GitHub API client covering both the REST and GraphQL surfaces.
///
/// All I/O goes through an injected [`HttpTransport`]; credentials and base
/// URLs come from the [`GithubConfig`] supplied at construction. The retry
/// policy lives here so it is shared by every call site.
#[derive(Clone)]
pub struct GithubClient {
    transport: Arc<dyn HttpTransport>,
    config: GithubConfig,
    retry: RetryConfig,
    rate_limiter: Option<ApiRateLimiter>,
}

impl GithubClient {
    pub fn new(config: GithubConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            config,
            retry: RetryConfig::default(),
            rate_limiter: None,
        }
    }

    /// Attach a proactive request pacer, awaited before every request.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: ApiRateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Override the rate-limit retry policy.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub(crate) fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub(crate) fn rest_url(&self, route: &str) -> String {
        format!("{}{}", self.config.rest_base_url, route)
    }

    /// Issue one request and classify the outcome by status code.
    async fn send(
        &self,
        request: HttpRequest,
        resource: &str,
    ) -> Result<HttpResponse, GithubError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| GithubError::network(e.to_string()))?;

        match response.status {
            200 => Ok(response),
            401 => Err(GithubError::Unauthorized),
            403 => Err(GithubError::RateLimited),
            404 => Err(GithubError::not_found(resource)),
            status => Err(GithubError::api(status, resource)),
        }
    }

    /// GET a REST route and deserialize the JSON payload.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        route: &str,
    ) -> Result<Fetched<T>, GithubError> {
        let request = HttpRequest::get(self.rest_url(route))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", &self.config.user_agent)
            .header("Authorization", format!("Bearer {}", self.config.token));

        let response = self.send(request, route).await?;

        let pagination = response
            .header("link")
            .map(parse_link_header)
            .unwrap_or_default();

        let data: T = serde_json::from_slice(&response.body)
            .map_err(|e| GithubError::internal(format!("JSON parse error for {route}: {e}")))?;

        Ok(Fetched { data, pagination })
    }

    /// POST a GraphQL query and return the `data` payload.
    ///
    /// GraphQL reports missing entities as a 200 with an `errors` array;
    /// `NOT_FOUND` entries are folded into the same classification as a
    /// REST 404.
    pub(crate) async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        resource: &str,
    ) -> Result<T, GithubError> {
        let body = serde_json::to_vec(&json!({
            "query": query,
            "variables": variables,
        }))
        .map_err(|e| GithubError::internal(format!("GraphQL body encode error: {e}")))?;

        let request = HttpRequest::post(self.config.graphql_url.clone(), body)
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.config.user_agent)
            .header("Authorization", format!("Bearer {}", self.config.token));

        let response = self.send(request, resource).await?;

        let envelope: GraphqlEnvelope<T> = serde_json::from_slice(&response.body)
            .map_err(|e| GithubError::internal(format!("GraphQL parse error for {resource}: {e}")))?;

        if !envelope.errors.is_empty() {
            if envelope
                .errors
                .iter()
                .any(|e| e.error_type.as_deref() == Some("NOT_FOUND"))
            {
                return Err(GithubError::not_found(resource));
            }
            let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(GithubError::internal(format!(
                "GraphQL errors for {resource}: {}",
                messages.join("; ")
            )));
        }

        envelope
            .data
            .ok_or_else(|| GithubError::internal(format!("GraphQL response for {resource} had no data")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, MockTransport, header_get};

    fn test_client(transport: &MockTransport) -> GithubClient {
        GithubClient::new(
            GithubConfig::with_token("test-token"),
            Arc::new(transport.clone()),
        )
    }

    #[test]
    fn parse_link_header_full() {
        let header = r#"<https://api.github.com/repos/a/b/commits?per_page=1&page=2>; rel="next", <https://api.github.com/repos/a/b/commits?per_page=1&page=8049>; rel="last""#;

        let info = parse_link_header(header);
        assert_eq!(info.next_page, Some(2));
        assert_eq!(info.last_page, Some(8049));
    }

    #[test]
    fn parse_link_header_partial_and_empty() {
        let next_only =
            r#"<https://api.github.com/repos/a/b/commits?per_page=1&page=2>; rel="next""#;
        let info = parse_link_header(next_only);
        assert_eq!(info.next_page, Some(2));
        assert_eq!(info.last_page, None);

        assert_eq!(parse_link_header(""), LinkPagination::default());
    }

    #[test]
    fn extract_page_from_url_handles_positions_and_absence() {
        assert_eq!(extract_page_from_url("https://x/commits?page=5"), Some(5));
        assert_eq!(
            extract_page_from_url("https://x/commits?per_page=1&page=42"),
            Some(42)
        );
        assert_eq!(extract_page_from_url("https://x/commits?per_page=1"), None);
        assert_eq!(extract_page_from_url("https://x/commits"), None);
    }

    #[tokio::test]
    async fn get_json_sends_bearer_auth_and_parses_payload() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            "https://api.github.com/repos/acme/widget",
            200,
            r#"{"stargazers_count": 7, "created_at": "2020-01-01T00:00:00Z"}"#,
            &[],
        );

        let client = test_client(&transport);
        let fetched: Fetched<super::super::types::RepoDetails> =
            client.get_json("/repos/acme/widget").await.unwrap();

        assert_eq!(fetched.data.stargazers_count, 7);
        assert_eq!(fetched.pagination, LinkPagination::default());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            header_get(&requests[0].headers, "authorization"),
            Some("Bearer test-token")
        );
        assert_eq!(
            header_get(&requests[0].headers, "accept"),
            Some("application/vnd.github+json")
        );
    }

    #[tokio::test]
    async fn status_codes_classify_to_error_variants() {
        let transport = MockTransport::new();
        let url = "https://api.github.com/repos/acme/widget";
        transport.push_json(HttpMethod::Get, url, 403, "{}", &[]);
        transport.push_json(HttpMethod::Get, url, 404, "{}", &[]);
        transport.push_json(HttpMethod::Get, url, 401, "{}", &[]);
        transport.push_json(HttpMethod::Get, url, 502, "{}", &[]);

        let client = test_client(&transport);
        let route = "/repos/acme/widget";

        let err = client.get_json::<Value>(route).await.unwrap_err();
        assert!(matches!(err, GithubError::RateLimited));

        let err = client.get_json::<Value>(route).await.unwrap_err();
        assert!(matches!(err, GithubError::NotFound { .. }));

        let err = client.get_json::<Value>(route).await.unwrap_err();
        assert!(matches!(err, GithubError::Unauthorized));

        let err = client.get_json::<Value>(route).await.unwrap_err();
        assert!(matches!(err, GithubError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        // Nothing scripted: the mock reports a transport-level failure.
        let transport = MockTransport::new();
        let client = test_client(&transport);

        let err = client.get_json::<Value>("/repos/acme/widget").await.unwrap_err();
        assert!(matches!(err, GithubError::Network { .. }));
    }

    #[tokio::test]
    async fn graphql_maps_not_found_errors() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            "https://api.github.com/graphql",
            200,
            r#"{"data": {"user": null}, "errors": [{"message": "x", "type": "NOT_FOUND"}]}"#,
            &[],
        );

        let client = test_client(&transport);
        let err = client
            .graphql::<Value>("query {}", json!({}), "user: ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, GithubError::NotFound { .. }));
    }

    #[tokio::test]
    async fn graphql_posts_query_and_variables() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            "https://api.github.com/graphql",
            200,
            r#"{"data": {"ok": true}}"#,
            &[],
        );

        let client = test_client(&transport);
        let data: Value = client
            .graphql("query($login: String!) { x }", json!({"login": "alice"}), "user: alice")
            .await
            .unwrap();
        assert_eq!(data["ok"], true);

        let requests = transport.requests();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["variables"]["login"], "alice");
        assert!(body["query"].as_str().unwrap().contains("$login"));
    }
}
