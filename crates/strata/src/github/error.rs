//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::HttpError;
use crate::index::IndexError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Primary or secondary rate limit exceeded.
    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// Invalid configuration, such as an unparsable API URL.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<HttpError> for GitHubError {
    fn from(err: HttpError) -> Self {
        GitHubError::Http(err.to_string())
    }
}

impl From<GitHubError> for IndexError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Http(message) => IndexError::Network { message },
            GitHubError::Json(e) => IndexError::Internal {
                message: format!("JSON parse error: {}", e),
            },
            GitHubError::Api { status, message } => match status {
                401 => IndexError::AuthRequired,
                404 => IndexError::NotFound { resource: message },
                429 => IndexError::RateLimited {
                    reset_at: Utc::now() + chrono::Duration::minutes(1),
                },
                _ => IndexError::Api {
                    message: format!("HTTP {}: {}", status, message),
                },
            },
            GitHubError::RateLimited { reset_at } => IndexError::RateLimited { reset_at },
            GitHubError::Config(message) => IndexError::Internal { message },
        }
    }
}

/// Check if an error indicates rate limiting.
pub fn is_rate_limit_error(err: &GitHubError) -> bool {
    matches!(
        err,
        GitHubError::RateLimited { .. } | GitHubError::Api { status: 429, .. }
    )
}
