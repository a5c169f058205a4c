use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use super::errors::Result;
use super::types::{IndexClient, RepositorySummary, SearchQuery};

type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default pacing for index calls (requests per second).
pub mod rate_limits {
    /// GitHub search allows 10 requests/minute anonymously and 30/minute
    /// authenticated; one per second stays under the authenticated quota
    /// for bursts of content listings too.
    pub const GITHUB_DEFAULT_RPS: u32 = 1;
}

fn quota(requests_per_second: u32) -> Quota {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    Quota::per_second(rps)
}

/// A standalone rate limiter for index calls.
///
/// ```ignore
/// let limiter = ApiRateLimiter::new(2);
/// limiter.wait().await;
/// client.search_repositories(&query, 0).await?;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a limiter allowing `requests_per_second` (0 is treated as 1).
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            inner: Arc::new(RateLimiter::direct(quota(requests_per_second))),
        }
    }

    /// Wait until another request is allowed.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

/// Decorator that paces every call to an inner [`IndexClient`].
///
/// ```ignore
/// let client = GitHubIndexClient::anonymous()?;
/// let client = RateLimitedIndex::new(client, rate_limits::GITHUB_DEFAULT_RPS);
/// ```
pub struct RateLimitedIndex<C> {
    inner: C,
    limiter: ApiRateLimiter,
}

impl<C> RateLimitedIndex<C> {
    pub fn new(inner: C, requests_per_second: u32) -> Self {
        Self {
            inner,
            limiter: ApiRateLimiter::new(requests_per_second),
        }
    }

    /// Wrap with an existing limiter, sharing its quota.
    pub fn with_limiter(inner: C, limiter: ApiRateLimiter) -> Self {
        Self { inner, limiter }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Clone> Clone for RateLimitedIndex<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            limiter: self.limiter.clone(),
        }
    }
}

#[async_trait]
impl<C: IndexClient> IndexClient for RateLimitedIndex<C> {
    async fn search_repositories(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<Vec<RepositorySummary>> {
        self.limiter.wait().await;
        self.inner.search_repositories(query, page).await
    }

    async fn total_count(&self, query: &SearchQuery) -> Result<u64> {
        self.limiter.wait().await;
        self.inner.total_count(query).await
    }

    async fn list_top_level_files(&self, repo: &RepositorySummary) -> Result<Vec<String>> {
        self.limiter.wait().await;
        self.inner.list_top_level_files(repo).await
    }

    async fn max_stars(&self, language: &str) -> Result<Option<u64>> {
        self.limiter.wait().await;
        self.inner.max_stars(language).await
    }
}
