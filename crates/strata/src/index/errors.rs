use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure of a call to the repository index.
///
/// Only [`IndexError::RateLimited`] is retried by the searcher; every other
/// variant ends the current range or filter pass.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index answered with an error status.
    #[error("index API error: {message}")]
    Api { message: String },

    /// The request quota is spent until `reset_at`.
    #[error("index rate limit exhausted until {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// The index rejected missing or invalid credentials.
    #[error("index requires authentication")]
    AuthRequired,

    /// A repository or listing does not exist.
    #[error("not found in index: {resource}")]
    NotFound { resource: String },

    /// The index could not be reached.
    #[error("index unreachable: {message}")]
    Network { message: String },

    /// The client could not be built or a response could not be decoded.
    #[error("unexpected index response: {message}")]
    Internal { message: String },
}

impl IndexError {
    #[inline]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether waiting for the quota to reset could make the call succeed.
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// First line of an error's message, for progress lines and log fields.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result of an index call.
pub type Result<T> = std::result::Result<T, IndexError>;
