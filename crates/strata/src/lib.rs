//! Strata - popularity-stratified repository sampling.
//!
//! This library samples repositories of a given language from a remote search
//! index, spreading the sample across star counts instead of taking the most
//! popular ones. Optionally only repositories with a build manifest at their
//! root (such as `pom.xml`) are kept.
//!
//! # Features
//!
//! - `github` - Enables the GitHub index client and the reqwest transport.
//!
//! # Example
//!
//! ```ignore
//! use strata::{GitHubIndexClient, RateLimitedIndex, SearchOptions, SearchSession, Searcher, rate_limits};
//!
//! let client = RateLimitedIndex::new(GitHubIndexClient::anonymous()?, rate_limits::GITHUB_DEFAULT_RPS);
//! let searcher = Searcher::connect(client, SearchOptions::default(), None).await;
//!
//! let mut session = SearchSession::new();
//! let report = searcher.find_with_star_repartition(&mut session, 25, false, None).await;
//! for repo in session.results() {
//!     println!("{} ({} stars)", repo.full_name(), repo.stars);
//! }
//! ```

pub mod http;
pub mod index;
pub mod retry;
pub mod search;

#[cfg(feature = "github")]
pub mod github;

#[cfg(test)]
mod testing;

#[cfg(feature = "github")]
pub use github::{GitHubError, GitHubIndexClient};
pub use index::{
    ApiRateLimiter, IndexClient, IndexError, RateLimitInfo, RateLimitedIndex, RepositorySummary,
    SearchQuery, StarRange, rate_limits,
};
pub use search::{
    FilterReport, ProgressCallback, SearchOptions, SearchProgress, SearchReport, SearchSession,
    Searcher,
};
