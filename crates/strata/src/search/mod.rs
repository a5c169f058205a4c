//! Popularity-stratified repository search.
//!
//! This module drives an [`IndexClient`](crate::index::IndexClient) to collect
//! a sample of repositories spread across star counts.
//!
//! # Module Structure
//!
//! - [`partition`] - Star-range sizing: `next_star_min()`, `next_range()`
//! - [`engine`] - `Searcher`: paging, deduplication, repartitioned sampling
//! - `manifest` - Manifest file filter with a refill quota
//! - `session` - `SearchSession`, the ordered and deduplicated result set
//! - `progress` - Progress reporting: `SearchProgress`, `ProgressCallback`, `emit()`
//! - `types` - `SearchOptions`, reports and constants
//!
//! # Example
//!
//! ```ignore
//! use strata::github::GitHubIndexClient;
//! use strata::search::{SearchOptions, SearchSession, Searcher};
//!
//! let client = GitHubIndexClient::anonymous()?;
//! let searcher = Searcher::connect(client, SearchOptions::default(), None).await;
//! let mut session = SearchSession::new();
//! let report = searcher.find_with_star_repartition(&mut session, 10, true, None).await;
//! println!("Found {}/{}", report.found, report.requested);
//! ```

pub mod engine;
mod manifest;
pub mod partition;
mod progress;
mod session;
mod types;

pub use engine::Searcher;
pub use manifest::{FilterOutcome, ManifestFilter, ManifestQuota};
pub use partition::{next_max_below, next_range, next_star_min};
pub use progress::{ProgressCallback, SearchProgress, emit};
pub use session::SearchSession;

// Re-export types
pub use types::{FilterReport, SearchOptions, SearchReport};

// Re-export constants
pub use types::{
    DEFAULT_LANGUAGE, DEFAULT_MANIFEST, DEFAULT_MAX_RETRIES, INITIAL_BACKOFF_MS, MAX_BACKOFF_MS,
};
