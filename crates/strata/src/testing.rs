//! In-memory index used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::index::{
    IndexClient, IndexError, PAGE_SIZE, RepositorySummary, Result, SearchQuery, SortOrder,
};

/// Build a repository summary with a deterministic name.
pub(crate) fn repo(id: u64, stars: u64) -> RepositorySummary {
    RepositorySummary {
        id,
        owner: "owner".to_string(),
        name: format!("repo-{id}"),
        stars,
        language: Some("Java".to_string()),
        default_branch: Some("main".to_string()),
        description: None,
        html_url: Some(format!("https://github.com/owner/repo-{id}")),
        updated_at: None,
    }
}

/// `count` repositories with ids starting at `first_id`, all at `stars`.
pub(crate) fn repos_at(first_id: u64, count: u64, stars: u64) -> Vec<RepositorySummary> {
    (first_id..first_id + count).map(|id| repo(id, stars)).collect()
}

/// A search index backed by a vector, in "most recently updated" order.
///
/// Repositories without an explicit listing have no manifest.
#[derive(Default)]
pub(crate) struct MockIndex {
    repos: Vec<RepositorySummary>,
    listings: HashMap<u64, Vec<String>>,
    failing_listings: HashSet<u64>,
    /// Fail every search call after this many have succeeded.
    fail_search_after: Option<usize>,
    /// Number of leading search calls that report a rate limit.
    rate_limited_searches: AtomicUsize,
    search_calls: Mutex<Vec<(SearchQuery, u32)>>,
    listing_calls: Mutex<Vec<u64>>,
}

impl MockIndex {
    pub(crate) fn new(repos: Vec<RepositorySummary>) -> Self {
        Self {
            repos,
            ..Self::default()
        }
    }

    /// Give every listed repository a top-level `manifest` file.
    pub(crate) fn with_manifest(mut self, ids: &[u64], manifest: &str) -> Self {
        for id in ids {
            self.listings.insert(
                *id,
                vec!["README.md".to_string(), manifest.to_string(), "src".to_string()],
            );
        }
        self
    }

    pub(crate) fn with_failing_listing(mut self, id: u64) -> Self {
        self.failing_listings.insert(id);
        self
    }

    pub(crate) fn fail_search_after(mut self, calls: usize) -> Self {
        self.fail_search_after = Some(calls);
        self
    }

    pub(crate) fn rate_limit_first_searches(self, calls: usize) -> Self {
        self.rate_limited_searches.store(calls, Ordering::SeqCst);
        self
    }

    pub(crate) fn search_calls(&self) -> Vec<(SearchQuery, u32)> {
        self.search_calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn listing_calls(&self) -> Vec<u64> {
        self.listing_calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn matching(&self, query: &SearchQuery) -> Vec<RepositorySummary> {
        let mut matched: Vec<RepositorySummary> = self
            .repos
            .iter()
            .filter(|r| {
                r.language
                    .as_deref()
                    .is_some_and(|l| l.eq_ignore_ascii_case(&query.language))
            })
            .filter(|r| query.stars.is_none_or(|range| range.contains(r.stars)))
            .cloned()
            .collect();
        if query.sort == SortOrder::Stars {
            matched.sort_by(|a, b| b.stars.cmp(&a.stars));
        }
        matched
    }
}

#[async_trait]
impl IndexClient for MockIndex {
    async fn search_repositories(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<Vec<RepositorySummary>> {
        let calls_so_far = {
            let mut calls = self.search_calls.lock().unwrap_or_else(|e| e.into_inner());
            calls.push((query.clone(), page));
            calls.len() - 1
        };

        let limited = self
            .rate_limited_searches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if limited {
            return Err(IndexError::RateLimited {
                reset_at: Utc::now(),
            });
        }

        if self.fail_search_after.is_some_and(|n| calls_so_far >= n) {
            return Err(IndexError::network("connection reset by peer"));
        }

        Ok(self
            .matching(query)
            .into_iter()
            .skip(page as usize * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect())
    }

    async fn total_count(&self, query: &SearchQuery) -> Result<u64> {
        Ok(self.matching(query).len() as u64)
    }

    async fn list_top_level_files(&self, repo: &RepositorySummary) -> Result<Vec<String>> {
        self.listing_calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(repo.id);

        if self.failing_listings.contains(&repo.id) {
            return Err(IndexError::network("listing failed"));
        }

        Ok(self
            .listings
            .get(&repo.id)
            .cloned()
            .unwrap_or_else(|| vec!["README.md".to_string()]))
    }
}
