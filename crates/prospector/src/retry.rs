//! Bounded retry for rate-limited operations.
//!
//! Rate-limit classifications are the only retryable failure; everything
//! else surfaces to the caller on the first attempt. The policy is bounded
//! exponential backoff with jitter, configured rather than hard-coded, and
//! the backoff sleep suspends the whole crawl (the policy is shared client
//! state, not per-call-site).

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::crawl::{CrawlProgress, ProgressCallback, emit};

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Maximum retry attempts for a rate-limited request.
pub const MAX_RATE_LIMIT_RETRIES: usize = 5;

/// Configuration for rate-limit retries.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_RATE_LIMIT_RETRIES,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Build the exponential backoff strategy for this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Execute an operation, retrying rate-limit errors per `config`.
///
/// Each retry emits a [`CrawlProgress::RateLimitBackoff`] event and a debug
/// log line. `context` names the request for reporting (e.g. `acme/widget`).
pub async fn with_retry<T, E, F, Fut, IsRateLimit>(
    mut operation: F,
    is_rate_limit: IsRateLimit,
    config: &RetryConfig,
    context: &str,
    on_progress: Option<&ProgressCallback>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
    IsRateLimit: Fn(&E) -> bool + Send + Sync + 'static,
{
    let context_str = context.to_string();
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(config.clone().into_backoff())
        .notify(|err, dur| {
            let current_attempt = attempt.load(Ordering::SeqCst);
            emit(
                on_progress,
                CrawlProgress::RateLimitBackoff {
                    context: context_str.clone(),
                    retry_after_ms: dur.as_millis() as u64,
                    attempt: current_attempt,
                },
            );
            tracing::debug!(
                "rate limited on {}, retrying in {:?} (attempt {}): {}",
                context_str,
                dur,
                current_attempt,
                err
            );
        })
        .when(is_rate_limit)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::AtomicU32;

    #[derive(Debug)]
    struct TestError {
        message: &'static str,
        rate_limited: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestError {}

    #[test]
    fn retry_config_default_matches_constants() {
        let config = RetryConfig::default();
        assert_eq!(config.min_delay, Duration::from_millis(INITIAL_BACKOFF_MS));
        assert_eq!(config.max_delay, Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(config.max_retries, MAX_RATE_LIMIT_RETRIES);
        assert!(config.with_jitter);
    }

    #[test]
    fn retry_config_custom_values_and_jitter_toggle() {
        let config =
            RetryConfig::new(Duration::from_secs(2), Duration::from_secs(30), 3).with_jitter(false);
        assert_eq!(config.min_delay, Duration::from_secs(2));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert!(!config.with_jitter);
    }

    #[tokio::test(start_paused = true)]
    async fn with_retry_retries_rate_limit_errors_and_emits_progress() {
        let calls = Arc::new(AtomicU32::new(0));

        let events: Arc<Mutex<Vec<CrawlProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let events_capture = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            events_capture
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event);
        });

        // Fail twice with a rate-limit error, then succeed.
        let calls_capture = Arc::clone(&calls);
        let operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                let n = calls_capture.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(TestError {
                        message: "rate limited",
                        rate_limited: true,
                    })
                } else {
                    Ok(7u32)
                }
            }
        };

        let result = with_retry(
            operation,
            |e: &TestError| e.rate_limited,
            &RetryConfig::default(),
            "acme/widget",
            Some(&callback),
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let events = events.lock().unwrap_or_else(|e| e.into_inner());
        let backoffs: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, CrawlProgress::RateLimitBackoff { .. }))
            .collect();
        assert_eq!(backoffs.len(), 2);
    }

    #[tokio::test]
    async fn with_retry_does_not_retry_non_rate_limit_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_capture = Arc::clone(&calls);

        let operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                calls_capture.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError {
                    message: "boom",
                    rate_limited: false,
                })
            }
        };

        let err = with_retry(
            operation,
            |e: &TestError| e.rate_limited,
            &RetryConfig::default(),
            "acme/widget",
            None,
        )
        .await
        .expect_err("expected error");

        assert_eq!(err.to_string(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn with_retry_gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_capture = Arc::clone(&calls);

        let operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                calls_capture.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError {
                    message: "rate limited",
                    rate_limited: true,
                })
            }
        };

        let config = RetryConfig::new(Duration::from_millis(10), Duration::from_millis(50), 2)
            .with_jitter(false);
        let err = with_retry(
            operation,
            |e: &TestError| e.rate_limited,
            &config,
            "acme/widget",
            None,
        )
        .await
        .expect_err("retries must be bounded");

        assert_eq!(err.to_string(), "rate limited");
        // Initial attempt plus two retries.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
