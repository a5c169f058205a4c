//! GitHub API data types.
//!
//! Only the fields the searcher needs are declared, which keeps decoding
//! resilient to additions in the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::index::{RateLimitInfo, RepositorySummary};

/// Response of `GET /search/repositories`.
///
/// API docs: https://docs.github.com/en/rest/search/search#search-repositories
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub total_count: u64,
    /// Set when the search timed out before scanning the whole index.
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<GitHubRepo>,
}

/// A repository item from a search response.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub owner: GitHubOwner,
    pub stargazers_count: u64,
    pub language: Option<String>,
    pub default_branch: Option<String>,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

impl From<GitHubRepo> for RepositorySummary {
    fn from(repo: GitHubRepo) -> Self {
        RepositorySummary {
            id: repo.id,
            owner: repo.owner.login,
            name: repo.name,
            stars: repo.stargazers_count,
            language: repo.language,
            default_branch: repo.default_branch,
            description: repo.description,
            html_url: repo.html_url,
            updated_at: repo.updated_at,
        }
    }
}

/// One entry of a directory listing from `GET /repos/{owner}/{repo}/contents`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    /// `file`, `dir`, `symlink` or `submodule`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// A single rate limit resource entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResource {
    /// Maximum requests allowed per period.
    pub limit: usize,
    /// Requests used in current period.
    #[serde(default)]
    pub used: usize,
    /// Remaining requests in current period.
    pub remaining: usize,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
}

impl RateLimitResource {
    /// Get the reset time as a DateTime.
    pub fn reset_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.reset as i64, 0).unwrap_or_else(Utc::now)
    }

    pub fn to_info(&self) -> RateLimitInfo {
        RateLimitInfo {
            limit: self.limit,
            remaining: self.remaining,
            reset_at: self.reset_at(),
        }
    }
}

/// The rate limit resources the searcher consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRateLimits {
    /// Core API limit, spent by contents listings.
    pub core: RateLimitResource,
    /// Search API limit, spent by repository searches and counts.
    pub search: RateLimitResource,
}

/// Response of `GET /rate_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRateLimitResponse {
    pub resources: GitHubRateLimits,
}
