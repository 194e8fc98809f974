//! Page-by-page listing of REST list endpoints.
//!
//! The endpoint family served here has no explicit last-page signal worth
//! trusting; an empty page is the only normal termination. A failure
//! mid-pagination is not fatal to the caller: whatever accumulated so far is
//! returned and the cause is logged.

use serde::de::DeserializeOwned;

use crate::crawl::{CrawlProgress, ProgressCallback, emit};

use super::client::GithubClient;

/// Fixed page size for all list endpoints.
pub const PAGE_SIZE: u32 = 100;

/// A paginated list endpoint: a display context plus a page → route mapping.
pub struct ListRoute {
    context: String,
    route_fn: Box<dyn Fn(u32) -> String + Send + Sync>,
}

impl ListRoute {
    /// Contributors of a repository.
    pub fn contributors(owner: &str, name: &str) -> Self {
        let (owner, name) = (owner.to_string(), name.to_string());
        Self {
            context: format!("{owner}/{name} contributors"),
            route_fn: Box::new(move |page| {
                format!("/repos/{owner}/{name}/contributors?per_page={PAGE_SIZE}&page={page}")
            }),
        }
    }

    /// Users followed by `login`.
    pub fn following(login: &str) -> Self {
        let login = login.to_string();
        Self {
            context: format!("{login} following"),
            route_fn: Box::new(move |page| {
                format!("/users/{login}/following?per_page={PAGE_SIZE}&page={page}")
            }),
        }
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[must_use]
    pub fn route_for(&self, page: u32) -> String {
        (self.route_fn)(page)
    }
}

impl GithubClient {
    /// Fetch every page of a list endpoint and concatenate the results.
    ///
    /// Requests start at page 1 and advance until an empty page. For `n`
    /// non-empty pages this makes exactly `n + 1` requests (the final empty
    /// one). Errors terminate the walk but keep the accumulated prefix.
    pub async fn list_all_pages<T: DeserializeOwned>(
        &self,
        route: &ListRoute,
        on_progress: Option<&ProgressCallback>,
    ) -> Vec<T> {
        let mut all_items: Vec<T> = Vec::new();
        let mut page = 1u32;

        loop {
            match self.get_json::<Vec<T>>(&route.route_for(page)).await {
                Ok(fetched) => {
                    if fetched.data.is_empty() {
                        break;
                    }

                    let count = fetched.data.len();
                    all_items.extend(fetched.data);

                    emit(
                        on_progress,
                        CrawlProgress::FetchedPage {
                            context: route.context().to_string(),
                            page,
                            count,
                            total_so_far: all_items.len(),
                        },
                    );

                    page += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "pagination of {} stopped at page {} with {} items: {}",
                        route.context(),
                        page,
                        all_items.len(),
                        e
                    );
                    break;
                }
            }
        }

        all_items
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::Value;

    use crate::config::GithubConfig;
    use crate::http::{HttpMethod, MockTransport};

    use super::*;

    fn test_client(transport: &MockTransport) -> GithubClient {
        GithubClient::new(
            GithubConfig::with_token("test-token"),
            Arc::new(transport.clone()),
        )
    }

    fn contributors_url(page: u32) -> String {
        format!(
            "https://api.github.com/repos/acme/widget/contributors?per_page=100&page={page}"
        )
    }

    #[test]
    fn routes_carry_page_size_and_page_number() {
        let route = ListRoute::contributors("acme", "widget");
        assert_eq!(
            route.route_for(3),
            "/repos/acme/widget/contributors?per_page=100&page=3"
        );
        assert_eq!(route.context(), "acme/widget contributors");

        let route = ListRoute::following("alice");
        assert_eq!(
            route.route_for(1),
            "/users/alice/following?per_page=100&page=1"
        );
    }

    #[tokio::test]
    async fn concatenates_pages_and_stops_on_empty_page() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            contributors_url(1),
            200,
            r#"[{"login": "alice"}, {"login": "bob"}]"#,
            &[],
        );
        transport.push_json(
            HttpMethod::Get,
            contributors_url(2),
            200,
            r#"[{"login": "carol"}]"#,
            &[],
        );
        transport.push_json(HttpMethod::Get, contributors_url(3), 200, "[]", &[]);

        let client = test_client(&transport);
        let route = ListRoute::contributors("acme", "widget");
        let items: Vec<Value> = client.list_all_pages(&route, None).await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[2]["login"], "carol");
        // Two non-empty pages plus the final empty one.
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn empty_first_page_returns_nothing_after_one_request() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, contributors_url(1), 200, "[]", &[]);

        let client = test_client(&transport);
        let route = ListRoute::contributors("acme", "widget");
        let items: Vec<Value> = client.list_all_pages(&route, None).await;

        assert!(items.is_empty());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn mid_pagination_error_keeps_partial_results() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            contributors_url(1),
            200,
            r#"[{"login": "alice"}]"#,
            &[],
        );
        transport.push_json(HttpMethod::Get, contributors_url(2), 500, "{}", &[]);

        let client = test_client(&transport);
        let route = ListRoute::contributors("acme", "widget");
        let items: Vec<Value> = client.list_all_pages(&route, None).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["login"], "alice");
    }

    #[tokio::test]
    async fn unauthorized_mid_pagination_is_not_fatal() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            contributors_url(1),
            200,
            r#"[{"login": "alice"}]"#,
            &[],
        );
        transport.push_json(HttpMethod::Get, contributors_url(2), 401, "{}", &[]);

        let client = test_client(&transport);
        let route = ListRoute::contributors("acme", "widget");
        let items: Vec<Value> = client.list_all_pages(&route, None).await;

        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn progress_events_report_running_totals() {
        use std::sync::Mutex;

        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            contributors_url(1),
            200,
            r#"[{"login": "alice"}, {"login": "bob"}]"#,
            &[],
        );
        transport.push_json(HttpMethod::Get, contributors_url(2), 200, "[]", &[]);

        let events: Arc<Mutex<Vec<CrawlProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let events_capture = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            events_capture
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event);
        });

        let client = test_client(&transport);
        let route = ListRoute::contributors("acme", "widget");
        let _items: Vec<Value> = client.list_all_pages(&route, Some(&callback)).await;

        let events = events.lock().unwrap_or_else(|e| e.into_inner());
        assert!(events.iter().any(|e| matches!(
            e,
            CrawlProgress::FetchedPage {
                page: 1,
                count: 2,
                total_so_far: 2,
                ..
            }
        )));
    }
}
