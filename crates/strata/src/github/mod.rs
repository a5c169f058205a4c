//! GitHub implementation of the repository index.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Response types for search, contents and rate limit endpoints
//! - `client` - `GitHubIndexClient`, the [`IndexClient`](crate::index::IndexClient) adapter
//!
//! ```ignore
//! use strata::github::GitHubIndexClient;
//! use strata::search::{SearchOptions, Searcher};
//!
//! let client = GitHubIndexClient::authenticated(&token)?;
//! let searcher = Searcher::connect(client, SearchOptions::default(), None).await;
//! ```

mod client;
pub mod error;
pub mod types;

pub use client::{DEFAULT_TIMEOUT_SECS, GITHUB_API_URL, GitHubIndexClient};
pub use error::{GitHubError, is_rate_limit_error};
pub use types::{GitHubRateLimits, RateLimitResource};
