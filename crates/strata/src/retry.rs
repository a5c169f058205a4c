//! Backoff for index calls that hit a rate limit.
//!
//! Only errors the caller classifies as rate limits are retried; anything else
//! fails on the first attempt. Retries are bounded so a search never waits
//! indefinitely on an exhausted quota.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::index::short_error_message;
use crate::search::{
    DEFAULT_MAX_RETRIES, INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, ProgressCallback, SearchProgress,
    emit,
};

/// How long and how often to back off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Delay before the first retry; doubles on each further attempt.
    pub initial_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: usize,
    /// Randomize delays so concurrent clients spread out.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// No retries: every rate limit fails the call immediately.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default().with_max_retries(0)
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_delay = initial;
        self.max_delay = max.max(initial);
        self
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);
        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Await `operation`, retrying while `is_rate_limit` accepts its error.
///
/// Each wait is reported as [`SearchProgress::RateLimitBackoff`] with the
/// 1-based number of the attempt that failed. Once retries run out the last
/// error is returned.
pub async fn with_retry<T, E, F, Fut, IsRateLimit>(
    mut operation: F,
    is_rate_limit: IsRateLimit,
    config: &RetryConfig,
    operation_name: &str,
    on_progress: Option<&ProgressCallback>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
    IsRateLimit: Fn(&E) -> bool + Send + Sync + 'static,
{
    let attempts = AtomicU32::new(0);

    let attempt = || {
        attempts.fetch_add(1, Ordering::Relaxed);
        operation()
    };

    attempt
        .retry(config.backoff())
        .when(is_rate_limit)
        .notify(|err, delay| {
            let failed = attempts.load(Ordering::Relaxed);
            tracing::debug!(
                operation = operation_name,
                attempt = failed,
                delay_ms = delay.as_millis() as u64,
                error = %short_error_message(err),
                "Rate limited, backing off"
            );
            emit(
                on_progress,
                SearchProgress::RateLimitBackoff {
                    operation: operation_name.to_string(),
                    retry_after_ms: delay.as_millis() as u64,
                    attempt: failed,
                },
            );
        })
        .await
}
