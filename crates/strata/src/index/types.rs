use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::Result;

/// Maximum number of items the search endpoint returns per page.
pub const PAGE_SIZE: usize = 100;

/// Maximum number of results the search endpoint exposes for one query.
pub const MAX_SEARCH_RESULTS: usize = 1000;

/// Number of pages reachable for a single query.
pub const MAX_SEARCH_PAGES: u32 = (MAX_SEARCH_RESULTS / PAGE_SIZE) as u32;

/// Star count used when the real ceiling cannot be discovered.
pub const UNBOUNDED_STARS: u64 = u64::MAX;

/// A repository as returned by the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySummary {
    /// Index-assigned numeric identifier. Deduplication keys on this.
    pub id: u64,
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Star count at the time of the query.
    pub stars: u64,
    /// Primary language as reported by the index.
    pub language: Option<String>,
    /// Default branch, used when listing the repository's files.
    pub default_branch: Option<String>,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RepositorySummary {
    /// Get the full name (owner/name).
    #[inline]
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// An inclusive star-count interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StarRange {
    pub min: u64,
    pub max: u64,
}

impl StarRange {
    /// Build a range, returning `None` when `min > max`.
    #[must_use]
    pub fn new(min: u64, max: u64) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    /// The range `[0, max]`.
    #[must_use]
    pub fn up_to(max: u64) -> Self {
        Self { min: 0, max }
    }

    #[must_use]
    pub fn contains(&self, stars: u64) -> bool {
        (self.min..=self.max).contains(&stars)
    }

    /// Whether this range ends at zero stars, i.e. nothing lies below it.
    #[must_use]
    pub fn reaches_floor(&self) -> bool {
        self.min == 0
    }
}

impl fmt::Display for StarRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Result ordering for a search query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Most recently updated first. Used for every sampling query.
    #[default]
    Updated,
    /// Most starred first. Used only to discover the star ceiling.
    Stars,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Updated => "updated",
            SortOrder::Stars => "stars",
        }
    }
}

/// A repository search, scoped to a language and optionally a star range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub language: String,
    pub stars: Option<StarRange>,
    pub sort: SortOrder,
}

impl SearchQuery {
    /// All repositories for a language, most recently updated first.
    #[must_use]
    pub fn language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            stars: None,
            sort: SortOrder::Updated,
        }
    }

    /// Repositories for a language within a star range.
    #[must_use]
    pub fn in_range(language: impl Into<String>, range: StarRange) -> Self {
        Self {
            stars: Some(range),
            ..Self::language(language)
        }
    }

    #[must_use]
    pub fn sorted_by(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Search qualifiers without the sort term, e.g. `language:java stars:0..10`.
    #[must_use]
    pub fn qualifiers(&self) -> String {
        match self.stars {
            Some(range) => format!("language:{} stars:{}", self.language, range),
            None => format!("language:{}", self.language),
        }
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sort:{}", self.qualifiers(), self.sort.as_str())
    }
}

/// Rate limit information reported by an index.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Maximum requests allowed per period.
    pub limit: usize,
    /// Remaining requests in current period.
    pub remaining: usize,
    /// When the rate limit resets.
    pub reset_at: DateTime<Utc>,
}

/// A searchable repository index.
///
/// Pages are 0-based at this boundary; adapters translate to whatever the
/// remote API expects. Every method is a single remote call (or a small
/// fixed number of them) and reports failures as [`IndexError`](super::IndexError).
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Fetch one page of search results, at most [`PAGE_SIZE`] items.
    async fn search_repositories(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<Vec<RepositorySummary>>;

    /// Total number of repositories matching a query.
    async fn total_count(&self, query: &SearchQuery) -> Result<u64>;

    /// Names of the entries at the root of a repository's default branch.
    async fn list_top_level_files(&self, repo: &RepositorySummary) -> Result<Vec<String>>;

    /// Highest star count among repositories of `language`.
    ///
    /// Returns `Ok(None)` when the language has no repositories at all.
    async fn max_stars(&self, language: &str) -> Result<Option<u64>> {
        let query = SearchQuery::language(language).sorted_by(SortOrder::Stars);
        let page = self.search_repositories(&query, 0).await?;
        Ok(page.first().map(|repo| repo.stars))
    }
}
