//! Search orchestration over star ranges.

use crate::index::{
    IndexClient, IndexError, MAX_SEARCH_PAGES, PAGE_SIZE, Result, SearchQuery, StarRange,
    UNBOUNDED_STARS, short_error_message,
};
use crate::retry::{RetryConfig, with_retry};

use super::manifest::{ManifestFilter, ManifestQuota};
use super::partition::{next_max_below, next_range};
use super::progress::{ProgressCallback, SearchProgress, emit};
use super::session::SearchSession;
use super::types::{FilterReport, SearchOptions, SearchReport};

/// Samples repositories of one language from an [`IndexClient`].
///
/// A searcher holds no results itself; every call appends to the
/// [`SearchSession`] it is given.
pub struct Searcher<C> {
    client: C,
    options: SearchOptions,
    manifest: ManifestFilter,
    retry: RetryConfig,
    ceiling: u64,
}

impl<C: IndexClient> Searcher<C> {
    /// Create a searcher, looking up the star ceiling for the language.
    ///
    /// The ceiling is the star count of the most starred repository. When the
    /// lookup fails or the language has no repositories, [`UNBOUNDED_STARS`]
    /// is used instead and the first range covers every star count.
    #[tracing::instrument(skip_all, fields(language = %options.language))]
    pub async fn connect(
        client: C,
        options: SearchOptions,
        on_progress: Option<&ProgressCallback>,
    ) -> Self {
        let retry = options.retry_config();
        let lookup = with_retry(
            || client.max_stars(&options.language),
            IndexError::is_rate_limited,
            &retry,
            "star ceiling lookup",
            on_progress,
        )
        .await;

        let (ceiling, fallback) = match lookup {
            Ok(Some(stars)) => (stars, false),
            Ok(None) => {
                tracing::warn!("No repositories found for ceiling lookup, searching unbounded");
                (UNBOUNDED_STARS, true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Star ceiling lookup failed, searching unbounded");
                (UNBOUNDED_STARS, true)
            }
        };

        emit(
            on_progress,
            SearchProgress::CeilingResolved {
                language: options.language.clone(),
                stars: ceiling,
                fallback,
            },
        );

        Self::with_ceiling(client, options, ceiling)
    }

    /// Create a searcher with a known star ceiling, skipping the lookup.
    pub fn with_ceiling(client: C, options: SearchOptions, ceiling: u64) -> Self {
        Self {
            manifest: ManifestFilter::new(options.manifest.clone()),
            retry: options.retry_config(),
            client,
            options,
            ceiling,
        }
    }

    /// Replace the retry policy derived from the options.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Upper star bound of the first searched range.
    #[must_use]
    pub fn ceiling_stars(&self) -> u64 {
        self.ceiling
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Find up to `number` repositories anywhere between zero and the ceiling.
    pub async fn find(
        &self,
        session: &mut SearchSession,
        number: usize,
        check_manifest: bool,
        on_progress: Option<&ProgressCallback>,
    ) -> usize {
        let range = StarRange::up_to(self.ceiling);
        self.find_in_range(session, number, check_manifest, range, on_progress)
            .await
    }

    /// Find up to `number` new repositories within `range`.
    ///
    /// Pages through the index from the first page, most recently updated
    /// first, until `number` repositories were added, a page comes back short,
    /// or the last reachable page was read. Repositories already in the
    /// session are skipped. With `check_manifest`, only repositories confirmed
    /// to contain the manifest are added.
    ///
    /// Index errors end the search early; the repositories added so far stay
    /// in the session.
    ///
    /// # Returns
    ///
    /// The number of repositories this call added to `session`.
    #[tracing::instrument(skip(self, session, range, on_progress), fields(range = %range))]
    pub async fn find_in_range(
        &self,
        session: &mut SearchSession,
        number: usize,
        check_manifest: bool,
        range: StarRange,
        on_progress: Option<&ProgressCallback>,
    ) -> usize {
        let query = SearchQuery::in_range(&self.options.language, range);
        let mut found = 0;
        let mut page = 0;

        while found < number {
            let items = match with_retry(
                || self.client.search_repositories(&query, page),
                IndexError::is_rate_limited,
                &self.retry,
                "repository search",
                on_progress,
            )
            .await
            {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(page, error = %e, "Search failed, keeping partial results");
                    emit(
                        on_progress,
                        SearchProgress::SearchAborted {
                            range,
                            error: short_error_message(&e),
                        },
                    );
                    return found;
                }
            };

            let count = items.len();
            let last_page = count < PAGE_SIZE || page + 1 >= MAX_SEARCH_PAGES;
            let fresh = session.retain_unseen(items);
            let remaining = number - found;

            let (eligible, filter_error) = if check_manifest {
                let outcome = self
                    .manifest
                    .filter(
                        &self.client,
                        fresh,
                        ManifestQuota::AtMost(remaining),
                        &self.retry,
                        on_progress,
                    )
                    .await;
                (outcome.confirmed, outcome.error)
            } else {
                (fresh, None)
            };

            let accepted = session.accept(eligible.into_iter().take(remaining));
            found += accepted;

            tracing::debug!(page, count, accepted, found, "Processed search page");
            emit(
                on_progress,
                SearchProgress::FetchedPage {
                    range,
                    page,
                    count,
                    accepted,
                },
            );

            if let Some(e) = filter_error {
                emit(
                    on_progress,
                    SearchProgress::FilterIncomplete {
                        error: short_error_message(&e),
                    },
                );
                return found;
            }

            if last_page {
                break;
            }
            page += 1;
        }

        if found < number {
            tracing::debug!(found, wanted = number, "Range exhausted");
            emit(
                on_progress,
                SearchProgress::RangeExhausted {
                    range,
                    found,
                    wanted: number,
                },
            );
        }

        found
    }

    /// Find `number` repositories spread across the popularity spectrum.
    ///
    /// Star ranges are carved downwards from the ceiling, each sized to hold
    /// roughly one of the repositories still missing, and one repository is
    /// taken from each. The search stops when `number` were found or the
    /// range reaching zero stars has been searched.
    #[tracing::instrument(skip(self, session, on_progress))]
    pub async fn find_with_star_repartition(
        &self,
        session: &mut SearchSession,
        number: usize,
        check_manifest: bool,
        on_progress: Option<&ProgressCallback>,
    ) -> SearchReport {
        let mut report = SearchReport::new(number);
        emit(
            on_progress,
            SearchProgress::Started {
                requested: number,
                ceiling: self.ceiling,
            },
        );

        let mut stars_max = Some(self.ceiling);
        while report.found < number
            && let Some(max) = stars_max
        {
            let range = next_range(max, number - report.found);
            report.found += self
                .find_in_range(session, 1, check_manifest, range, on_progress)
                .await;
            report.ranges.push(range);

            emit(
                on_progress,
                SearchProgress::RangeSearched {
                    range,
                    found: report.found,
                    requested: number,
                },
            );

            stars_max = next_max_below(range);
        }

        if report.is_complete() {
            tracing::info!(
                found = report.found,
                ranges = report.ranges.len(),
                "Repartitioned search complete"
            );
        } else {
            tracing::warn!(
                found = report.found,
                requested = number,
                shortfall = report.shortfall(),
                "Star ranges exhausted before the sample was complete"
            );
        }

        emit(
            on_progress,
            SearchProgress::Finished {
                found: report.found,
                requested: number,
            },
        );

        report
    }

    /// Remove repositories without the manifest from `session`.
    ///
    /// If an index error stops the pass, the repositories not yet checked
    /// stay in the session and the report is marked incomplete.
    pub async fn filter_manifest(
        &self,
        session: &mut SearchSession,
        on_progress: Option<&ProgressCallback>,
    ) -> FilterReport {
        let repos = session.take_results();
        let outcome = self
            .manifest
            .filter(
                &self.client,
                repos,
                ManifestQuota::All,
                &self.retry,
                on_progress,
            )
            .await;

        let checked = outcome.confirmed.len() + outcome.rejected;
        let complete = outcome.is_complete();
        if let Some(e) = &outcome.error {
            emit(
                on_progress,
                SearchProgress::FilterIncomplete {
                    error: short_error_message(e),
                },
            );
        }

        session.accept(outcome.confirmed);
        session.accept(outcome.unchecked);

        FilterReport {
            checked,
            removed: outcome.rejected,
            kept: session.len(),
            complete,
        }
    }

    /// Number of repositories of the configured language within `range`.
    pub async fn total_repository_count(&self, range: StarRange) -> Result<u64> {
        let query = SearchQuery::in_range(&self.options.language, range);
        self.count(&query).await
    }

    /// Number of repositories of the configured language up to the ceiling.
    pub async fn total_repository_count_all(&self) -> Result<u64> {
        let query = if self.ceiling == UNBOUNDED_STARS {
            SearchQuery::language(&self.options.language)
        } else {
            SearchQuery::in_range(&self.options.language, StarRange::up_to(self.ceiling))
        };
        self.count(&query).await
    }

    async fn count(&self, query: &SearchQuery) -> Result<u64> {
        with_retry(
            || self.client.total_count(query),
            IndexError::is_rate_limited,
            &self.retry,
            "total count",
            None,
        )
        .await
    }
}
