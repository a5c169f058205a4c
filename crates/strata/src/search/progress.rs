//! Progress events emitted while searching.

use std::fmt;

use crate::index::StarRange;

/// Progress events emitted during a search session.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SearchProgress {
    /// The upper star bound for the language was resolved.
    CeilingResolved {
        language: String,
        stars: u64,
        /// True when the lookup failed and the unbounded ceiling is used.
        fallback: bool,
    },

    /// A repartitioned search is starting.
    Started {
        /// Number of repositories requested.
        requested: usize,
        /// Upper star bound of the first range.
        ceiling: u64,
    },

    /// Processed one page of search results.
    FetchedPage {
        range: StarRange,
        /// Page number (0-based).
        page: u32,
        /// Items returned by the index.
        count: usize,
        /// Items accepted into the session.
        accepted: usize,
    },

    /// Checked one repository for the manifest file.
    ManifestChecked {
        repository: String,
        present: bool,
    },

    /// A star range ran out of candidates before the demand was met.
    RangeExhausted {
        range: StarRange,
        /// Repositories this range contributed.
        found: usize,
        /// Repositories asked of this range.
        wanted: usize,
    },

    /// Finished one range of a repartitioned search.
    RangeSearched {
        range: StarRange,
        /// Running total found so far.
        found: usize,
        /// Total requested.
        requested: usize,
    },

    /// An index error ended pagination of a range early.
    SearchAborted { range: StarRange, error: String },

    /// An index error ended a manifest filter pass early.
    FilterIncomplete { error: String },

    /// Rate limited, backing off before retry.
    RateLimitBackoff {
        /// Index call being retried.
        operation: String,
        /// Time to wait before retry (ms).
        retry_after_ms: u64,
        /// Current attempt number.
        attempt: u32,
    },

    /// A repartitioned search finished.
    Finished { found: usize, requested: usize },
}

impl fmt::Display for SearchProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchProgress::CeilingResolved {
                language,
                stars,
                fallback: false,
            } => write!(f, "Most starred {language} repository has {stars} stars"),
            SearchProgress::CeilingResolved {
                language,
                fallback: true,
                ..
            } => write!(f, "Could not resolve star ceiling for {language}, searching unbounded"),
            SearchProgress::Started { .. } => write!(f, "Starting search..."),
            SearchProgress::FetchedPage {
                range,
                page,
                count,
                accepted,
            } => write!(f, "Stars {range}, page {page}: {accepted}/{count} accepted"),
            SearchProgress::ManifestChecked {
                repository,
                present,
            } => {
                let verdict = if *present { "has" } else { "lacks" };
                write!(f, "{repository} {verdict} manifest")
            }
            SearchProgress::RangeExhausted {
                range,
                found,
                wanted,
            } => write!(f, "Stars {range} exhausted after {found}/{wanted}"),
            SearchProgress::RangeSearched {
                found, requested, ..
            }
            | SearchProgress::Finished { found, requested } => {
                write!(f, "Found: {found}/{requested}")
            }
            SearchProgress::SearchAborted { range, error } => {
                write!(f, "Search of stars {range} aborted: {error}")
            }
            SearchProgress::FilterIncomplete { error } => {
                write!(f, "Manifest filtering incomplete: {error}")
            }
            SearchProgress::RateLimitBackoff {
                operation,
                retry_after_ms,
                attempt,
            } => write!(
                f,
                "Rate limited during {operation}, retrying in {retry_after_ms}ms (attempt {attempt})"
            ),
        }
    }
}

/// Progress callback for search operations.
pub type ProgressCallback = Box<dyn Fn(SearchProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SearchProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
