//! GitHub search index client.

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use url::Url;

use super::error::GitHubError;
use super::types::{ContentEntry, GitHubRateLimitResponse, GitHubRateLimits, SearchResponse};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpHeaders, HttpRequest, HttpResponse, HttpTransport, header_get};
use crate::index::{
    self, IndexClient, PAGE_SIZE, RateLimitInfo, RepositorySummary, SearchQuery, SortOrder,
};

/// Public GitHub REST API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("strata/", env!("CARGO_PKG_VERSION"));

/// GitHub API client implementing [`IndexClient`].
///
/// Without a token every request is anonymous, which GitHub limits to 10
/// searches per minute and 60 core requests per hour.
#[derive(Clone)]
pub struct GitHubIndexClient {
    transport: Arc<dyn HttpTransport>,
    api_url: Url,
    token: Option<String>,
    last_rate_limit: Arc<Mutex<Option<RateLimitInfo>>>,
}

impl GitHubIndexClient {
    /// Create a new GitHub client.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal access token, or `None` for anonymous access
    /// * `api_url` - API base URL (e.g., "https://api.github.com")
    /// * `timeout` - Per-request HTTP timeout
    ///
    /// # Example
    ///
    /// ```ignore
    /// // Authenticated access to github.com
    /// let client = GitHubIndexClient::new(Some("ghp_..."), GITHUB_API_URL, Duration::from_secs(30))?;
    ///
    /// // GitHub Enterprise Server
    /// let client = GitHubIndexClient::new(Some(token), "https://ghe.example.com/api/v3", timeout)?;
    /// ```
    pub fn new(
        token: Option<&str>,
        api_url: &str,
        timeout: StdDuration,
    ) -> Result<Self, GitHubError> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| GitHubError::Config(e.to_string()))?;
        Self::new_with_transport(token, api_url, Arc::new(transport))
    }

    /// Anonymous client for github.com with the default timeout.
    pub fn anonymous() -> Result<Self, GitHubError> {
        Self::new(
            None,
            GITHUB_API_URL,
            StdDuration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Authenticated client for github.com with the default timeout.
    pub fn authenticated(token: &str) -> Result<Self, GitHubError> {
        Self::new(
            Some(token),
            GITHUB_API_URL,
            StdDuration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn new_with_transport(
        token: Option<&str>,
        api_url: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, GitHubError> {
        let api_url = Url::parse(api_url.trim_end_matches('/'))
            .map_err(|e| GitHubError::Config(format!("invalid API URL {api_url:?}: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(GitHubError::Config(format!(
                "invalid API URL {api_url}: not a base URL"
            )));
        }

        Ok(Self {
            transport,
            api_url,
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
            last_rate_limit: Arc::new(Mutex::new(None)),
        })
    }

    /// Get the API base URL.
    pub fn api_url(&self) -> &str {
        self.api_url.as_str()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Rate limit reported by the most recent response, if it carried one.
    pub fn last_rate_limit(&self) -> Option<RateLimitInfo> {
        self.last_rate_limit
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // Base-ness was checked at construction.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL of one search page. `page` is 0-based; GitHub counts from 1.
    pub(crate) fn search_url(&self, query: &SearchQuery, page: u32, per_page: usize) -> Url {
        let mut url = self.endpoint(&["search", "repositories"]);
        url.query_pairs_mut()
            .append_pair("q", &query.qualifiers())
            .append_pair("sort", query.sort.as_str())
            .append_pair("order", "desc")
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &(page + 1).to_string());
        url
    }

    pub(crate) fn contents_url(&self, owner: &str, name: &str) -> Url {
        self.endpoint(&["repos", owner, name, "contents"])
    }

    /// Extract rate limit info from GitHub response headers.
    fn parse_rate_limit_headers(headers: &HttpHeaders) -> Option<RateLimitInfo> {
        let limit = header_get(headers, "x-ratelimit-limit")?
            .parse::<usize>()
            .ok()?;
        let remaining = header_get(headers, "x-ratelimit-remaining")?
            .parse::<usize>()
            .ok()?;
        let reset_epoch = header_get(headers, "x-ratelimit-reset")?
            .parse::<i64>()
            .ok()?;
        let reset_at = DateTime::from_timestamp(reset_epoch, 0).unwrap_or_else(Utc::now);
        Some(RateLimitInfo {
            limit,
            remaining,
            reset_at,
        })
    }

    fn record_rate_limit(&self, headers: &HttpHeaders) {
        if let Some(info) = Self::parse_rate_limit_headers(headers) {
            if info.remaining == 0 {
                tracing::debug!(reset_at = %info.reset_at, "GitHub rate limit exhausted");
            }
            *self
                .last_rate_limit
                .lock()
                .unwrap_or_else(|e| e.into_inner()) = Some(info);
        }
    }

    /// When a 403/429 response is a rate limit, the time it lifts.
    fn rate_limit_reset(headers: &HttpHeaders) -> Option<DateTime<Utc>> {
        if let Some(secs) = header_get(headers, "retry-after").and_then(|v| v.parse::<i64>().ok())
        {
            return Some(Utc::now() + chrono::Duration::seconds(secs));
        }

        if header_get(headers, "x-ratelimit-remaining") == Some("0") {
            let reset = header_get(headers, "x-ratelimit-reset")
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(|epoch| DateTime::from_timestamp(epoch, 0));
            return Some(reset.unwrap_or_else(|| Utc::now() + chrono::Duration::minutes(1)));
        }

        None
    }

    fn check_status(response: &HttpResponse) -> Result<(), GitHubError> {
        if response.is_success() {
            return Ok(());
        }

        if matches!(response.status, 403 | 429)
            && let Some(reset_at) = Self::rate_limit_reset(&response.headers)
        {
            return Err(GitHubError::RateLimited { reset_at });
        }

        // Error bodies are `{"message": "..."}`; fall back to the raw text.
        let message = serde_json::from_slice::<serde_json::Value>(&response.body)
            .ok()
            .and_then(|v| v.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| response.body_text());

        Err(GitHubError::Api {
            status: response.status,
            message,
        })
    }

    /// Make a GET request, authenticated when a token is configured.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, GitHubError> {
        let mut request = HttpRequest::get(url.as_str())
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = self.transport.send(request).await?;
        self.record_rate_limit(&response.headers);
        Self::check_status(&response)?;

        serde_json::from_slice(&response.body).map_err(GitHubError::Json)
    }

    /// Fetch one page of repository search results.
    pub async fn search_page(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: usize,
    ) -> Result<SearchResponse, GitHubError> {
        tracing::debug!(query = %query, page, per_page, "Searching repositories");
        let response: SearchResponse = self.get(self.search_url(query, page, per_page)).await?;
        if response.incomplete_results {
            tracing::warn!(query = %query, page, "GitHub returned incomplete search results");
        }
        Ok(response)
    }

    /// List the entries at the root of a repository's default branch.
    pub async fn list_contents(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Vec<ContentEntry>, GitHubError> {
        self.get(self.contents_url(owner, name)).await
    }

    /// Fetch current rate limits for the core and search APIs.
    pub async fn rate_limit(&self) -> Result<GitHubRateLimits, GitHubError> {
        let response: GitHubRateLimitResponse = self.get(self.endpoint(&["rate_limit"])).await?;
        Ok(response.resources)
    }
}

#[async_trait]
impl IndexClient for GitHubIndexClient {
    async fn search_repositories(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> index::Result<Vec<RepositorySummary>> {
        let response = self.search_page(query, page, PAGE_SIZE).await?;
        Ok(response
            .items
            .into_iter()
            .map(RepositorySummary::from)
            .collect())
    }

    async fn total_count(&self, query: &SearchQuery) -> index::Result<u64> {
        Ok(self.search_page(query, 0, 1).await?.total_count)
    }

    async fn list_top_level_files(&self, repo: &RepositorySummary) -> index::Result<Vec<String>> {
        match self.list_contents(&repo.owner, &repo.name).await {
            Ok(entries) => Ok(entries.into_iter().map(|entry| entry.name).collect()),
            // Empty repositories have no contents to list.
            Err(GitHubError::Api { status: 404, .. }) => {
                tracing::debug!(repo = %repo.full_name(), "Repository has no contents");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn max_stars(&self, language: &str) -> index::Result<Option<u64>> {
        let query = SearchQuery::language(language).sorted_by(SortOrder::Stars);
        let response = self.search_page(&query, 0, 1).await?;
        Ok(response.items.first().map(|repo| repo.stargazers_count))
    }
}
