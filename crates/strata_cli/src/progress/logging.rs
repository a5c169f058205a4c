use strata::SearchProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SearchProgress) {
        match event {
            SearchProgress::CeilingResolved {
                language,
                stars,
                fallback,
            } => {
                if fallback {
                    tracing::warn!(language = %language, "Star ceiling unknown, searching unbounded");
                } else {
                    tracing::info!(language = %language, stars, "Resolved star ceiling");
                }
            }

            SearchProgress::Started { requested, ceiling } => {
                tracing::info!(requested, ceiling, "Starting repartitioned search");
            }

            SearchProgress::FetchedPage {
                range,
                page,
                count,
                accepted,
            } => {
                tracing::debug!(range = %range, page, count, accepted, "Fetched page");
            }

            SearchProgress::ManifestChecked {
                repository,
                present,
            } => {
                tracing::debug!(repo = %repository, present, "Checked manifest");
            }

            SearchProgress::RangeExhausted {
                range,
                found,
                wanted,
            } => {
                tracing::info!(range = %range, found, wanted, "Range exhausted");
            }

            SearchProgress::RangeSearched {
                range,
                found,
                requested,
            } => {
                tracing::info!(range = %range, "Found: {}/{}", found, requested);
            }

            SearchProgress::SearchAborted { range, error } => {
                tracing::warn!(range = %range, error = %error, "Search aborted");
            }

            SearchProgress::FilterIncomplete { error } => {
                tracing::warn!(error = %error, "Manifest filtering incomplete");
            }

            SearchProgress::RateLimitBackoff {
                operation,
                retry_after_ms,
                attempt,
            } => {
                tracing::warn!(
                    operation = %operation,
                    retry_after_ms,
                    attempt,
                    "Rate limited, backing off"
                );
            }

            SearchProgress::Finished { found, requested } => {
                tracing::info!(found, requested, "Search finished");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
