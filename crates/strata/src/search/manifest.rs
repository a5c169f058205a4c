//! Manifest filter: keep repositories with a given file at their root.

use crate::index::{IndexClient, IndexError, RepositorySummary, Result};
use crate::retry::{RetryConfig, with_retry};

use super::progress::{ProgressCallback, SearchProgress, emit};

/// How many passing repositories a filter pass should look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestQuota {
    /// Check every repository.
    All,
    /// Stop scanning once this many repositories have passed.
    AtMost(usize),
}

impl ManifestQuota {
    fn is_met(self, confirmed: usize) -> bool {
        match self {
            ManifestQuota::All => false,
            ManifestQuota::AtMost(n) => confirmed >= n,
        }
    }
}

/// Result of one filter pass.
///
/// Only `confirmed` repositories are known to contain the manifest.
/// `unchecked` holds the tail that was never scanned, either because the
/// quota was met or because `error` stopped the pass.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub confirmed: Vec<RepositorySummary>,
    pub unchecked: Vec<RepositorySummary>,
    pub rejected: usize,
    pub error: Option<IndexError>,
}

impl FilterOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Checks repositories for a manifest file such as `pom.xml`.
#[derive(Debug, Clone)]
pub struct ManifestFilter {
    manifest: String,
}

impl ManifestFilter {
    pub fn new(manifest: impl Into<String>) -> Self {
        Self {
            manifest: manifest.into(),
        }
    }

    #[must_use]
    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    /// Whether `repo` has the manifest among its top-level entries.
    pub async fn has_manifest<C: IndexClient + ?Sized>(
        &self,
        client: &C,
        repo: &RepositorySummary,
        retry: &RetryConfig,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<bool> {
        let files = with_retry(
            || client.list_top_level_files(repo),
            IndexError::is_rate_limited,
            retry,
            "contents listing",
            on_progress,
        )
        .await?;
        Ok(files.iter().any(|name| name == &self.manifest))
    }

    /// Split `repos` into confirmed, rejected and unchecked repositories.
    ///
    /// Repositories are scanned in order. Scanning stops when `quota` is met
    /// or on the first index error.
    pub async fn filter<C: IndexClient + ?Sized>(
        &self,
        client: &C,
        repos: Vec<RepositorySummary>,
        quota: ManifestQuota,
        retry: &RetryConfig,
        on_progress: Option<&ProgressCallback>,
    ) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();
        let mut pending = repos.into_iter();

        for repo in pending.by_ref() {
            if quota.is_met(outcome.confirmed.len()) {
                outcome.unchecked.push(repo);
                break;
            }

            match self.has_manifest(client, &repo, retry, on_progress).await {
                Ok(present) => {
                    emit(
                        on_progress,
                        SearchProgress::ManifestChecked {
                            repository: repo.full_name(),
                            present,
                        },
                    );
                    if present {
                        outcome.confirmed.push(repo);
                    } else {
                        tracing::debug!(repo = %repo.full_name(), manifest = %self.manifest, "Manifest missing");
                        outcome.rejected += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        repo = %repo.full_name(),
                        error = %e,
                        "Listing failed, manifest filtering incomplete"
                    );
                    outcome.unchecked.push(repo);
                    outcome.error = Some(e);
                    break;
                }
            }
        }

        outcome.unchecked.extend(pending);
        outcome
    }
}
