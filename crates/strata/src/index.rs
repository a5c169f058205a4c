//! Platform-agnostic interface to a remote repository search index.
//!
//! The search core talks to the index only through [`IndexClient`]: one page
//! of search results, a total count, and a top-level file listing. Adapters
//! (see `crate::github`) own authentication, HTTP and JSON decoding.

mod errors;
mod rate_limit;
mod types;

pub use errors::{IndexError, Result, short_error_message};
pub use rate_limit::{ApiRateLimiter, RateLimitedIndex, rate_limits};
pub use types::{
    IndexClient, MAX_SEARCH_PAGES, MAX_SEARCH_RESULTS, PAGE_SIZE, RateLimitInfo,
    RepositorySummary, SearchQuery, SortOrder, StarRange, UNBOUNDED_STARS,
};
