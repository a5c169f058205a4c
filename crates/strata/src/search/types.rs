//! Search options, reports and shared constants.

use serde::Serialize;

use crate::index::StarRange;
use crate::retry::RetryConfig;

/// Language searched when none is configured.
pub const DEFAULT_LANGUAGE: &str = "java";

/// Manifest file required by the manifest filter when none is configured.
pub const DEFAULT_MANIFEST: &str = "pom.xml";

/// Retries for a single rate-limited index call.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Maximum backoff delay in milliseconds when rate limited.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Options shared by every search a [`Searcher`](super::Searcher) runs.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Language qualifier for every query.
    pub language: String,
    /// File name that must sit at the repository root to pass the manifest filter.
    pub manifest: String,
    /// Retries for a rate-limited index call before it counts as a failure.
    pub max_retries: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl SearchOptions {
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub(crate) fn retry_config(&self) -> RetryConfig {
        RetryConfig::default().with_max_retries(self.max_retries)
    }
}

/// Outcome of a star-repartitioned search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchReport {
    /// Number of repositories asked for.
    pub requested: usize,
    /// Number of repositories added to the session.
    pub found: usize,
    /// Star ranges searched, in order.
    pub ranges: Vec<StarRange>,
}

impl SearchReport {
    pub(crate) fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    /// How many requested repositories could not be found.
    #[must_use]
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.found)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.found >= self.requested
    }
}

/// Outcome of a post-hoc manifest filter over a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    /// Repositories whose listing was fetched.
    pub checked: usize,
    /// Repositories removed for lacking the manifest.
    pub removed: usize,
    /// Repositories left in the session (confirmed plus unchecked).
    pub kept: usize,
    /// False when an index error stopped the pass early; the unchecked
    /// repositories then remain in the session unvalidated.
    pub complete: bool,
}
