//! Integration tests for repartitioned sampling.
//!
//! These drive the public search API against an in-memory index and make
//! sure every search terminates, even when the index cannot satisfy the
//! requested sample.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use strata::index::{
    self, IndexClient, IndexError, PAGE_SIZE, RateLimitedIndex, RepositorySummary, SearchQuery,
    SortOrder, StarRange, UNBOUNDED_STARS,
};
use strata::search::{ProgressCallback, SearchOptions, SearchProgress, SearchSession, Searcher};

/// Maximum time any search should take in tests.
/// If exceeded, the range loop is probably not terminating.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

fn repo(id: u64, stars: u64) -> RepositorySummary {
    RepositorySummary {
        id,
        owner: format!("owner-{}", id % 7),
        name: format!("project-{id}"),
        stars,
        language: Some("Java".to_string()),
        default_branch: Some("main".to_string()),
        description: None,
        html_url: None,
        updated_at: None,
    }
}

/// Index whose repository counts grow towards low star counts.
///
/// Repository `i` (from 1) has `ceiling / i` stars, so there is one
/// repository near the ceiling and many near zero.
fn popularity_curve(count: u64, ceiling: u64) -> Vec<RepositorySummary> {
    (1..=count).map(|i| repo(i, ceiling / i)).collect()
}

#[derive(Default)]
struct InMemoryIndex {
    repos: Vec<RepositorySummary>,
    manifests: HashSet<u64>,
    listings_failing: bool,
    searches: Mutex<usize>,
}

impl InMemoryIndex {
    fn new(repos: Vec<RepositorySummary>) -> Self {
        Self {
            repos,
            ..Self::default()
        }
    }

    fn with_manifests(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.manifests.extend(ids);
        self
    }

    fn searches(&self) -> usize {
        *self.searches.lock().unwrap()
    }

    fn matching(&self, query: &SearchQuery) -> Vec<RepositorySummary> {
        let mut matched: Vec<RepositorySummary> = self
            .repos
            .iter()
            .filter(|r| {
                r.language
                    .as_deref()
                    .is_some_and(|l| l.eq_ignore_ascii_case(&query.language))
            })
            .filter(|r| query.stars.is_none_or(|range| range.contains(r.stars)))
            .cloned()
            .collect();
        if query.sort == SortOrder::Stars {
            matched.sort_by(|a, b| b.stars.cmp(&a.stars));
        }
        matched
    }
}

#[async_trait]
impl IndexClient for InMemoryIndex {
    async fn search_repositories(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> index::Result<Vec<RepositorySummary>> {
        *self.searches.lock().unwrap() += 1;
        Ok(self
            .matching(query)
            .into_iter()
            .skip(page as usize * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect())
    }

    async fn total_count(&self, query: &SearchQuery) -> index::Result<u64> {
        Ok(self.matching(query).len() as u64)
    }

    async fn list_top_level_files(&self, repo: &RepositorySummary) -> index::Result<Vec<String>> {
        if self.listings_failing {
            return Err(IndexError::network("listing unavailable"));
        }
        let mut files = vec!["README.md".to_string()];
        if self.manifests.contains(&repo.id) {
            files.push("pom.xml".to_string());
        }
        Ok(files)
    }
}

fn assert_contiguous(ranges: &[StarRange]) {
    for pair in ranges.windows(2) {
        assert!(pair[1].max < pair[0].min, "ranges must descend: {pair:?}");
        assert_eq!(pair[1].max + 1, pair[0].min, "ranges must be contiguous");
    }
}

fn assert_distinct(repos: &[RepositorySummary]) {
    let ids: HashSet<u64> = repos.iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), repos.len(), "session holds duplicates");
}

#[tokio::test]
async fn repartition_spreads_sample_across_star_ranges() {
    let index = InMemoryIndex::new(popularity_curve(5_000, 50_000));
    let searcher = Searcher::connect(index, SearchOptions::default(), None).await;
    assert_eq!(searcher.ceiling_stars(), 50_000);

    let mut session = SearchSession::new();
    let report = tokio::time::timeout(
        SEARCH_TIMEOUT,
        searcher.find_with_star_repartition(&mut session, 20, false, None),
    )
    .await
    .expect("search should not hang");

    assert_eq!(report.found, 20);
    assert_eq!(report.shortfall(), 0);
    assert_eq!(session.len(), 20);
    assert_distinct(session.results());
    assert_eq!(report.ranges[0].max, 50_000);
    assert_contiguous(&report.ranges);

    // Every accepted repository lies in a different range.
    let mut per_range: HashMap<StarRange, usize> = HashMap::new();
    for repo in session.results() {
        let range = report
            .ranges
            .iter()
            .find(|r| r.contains(repo.stars))
            .expect("repository outside searched ranges");
        *per_range.entry(*range).or_default() += 1;
    }
    assert!(per_range.values().all(|&n| n == 1));
}

#[tokio::test]
async fn repartition_over_sparse_index_reports_shortfall() {
    let index = InMemoryIndex::new(vec![repo(1, 1000), repo(2, 400), repo(3, 2)]);
    let index = RateLimitedIndex::new(index, 1_000);
    let searcher = Searcher::with_ceiling(index, SearchOptions::default(), 1000);
    let mut session = SearchSession::new();

    let report = tokio::time::timeout(
        SEARCH_TIMEOUT,
        searcher.find_with_star_repartition(&mut session, 10, false, None),
    )
    .await
    .expect("search should terminate");

    assert_eq!(report.requested, 10);
    assert_eq!(report.found, 3);
    assert_eq!(report.shortfall(), 7);
    assert!(!report.is_complete());
    assert_eq!(report.ranges.last().map(|r| r.min), Some(0));
    assert_contiguous(&report.ranges);
}

#[tokio::test]
async fn repartition_with_unbounded_ceiling_terminates() {
    let searcher = Searcher::with_ceiling(
        InMemoryIndex::new(popularity_curve(50, 10_000)),
        SearchOptions::default(),
        UNBOUNDED_STARS,
    );
    let mut session = SearchSession::new();

    let report = tokio::time::timeout(
        SEARCH_TIMEOUT,
        searcher.find_with_star_repartition(&mut session, 5, false, None),
    )
    .await
    .expect("search should terminate");

    assert_eq!(report.found, 5);
    assert_eq!(report.ranges[0].max, UNBOUNDED_STARS);
    assert_contiguous(&report.ranges);
}

#[tokio::test]
async fn manifest_checked_sample_only_holds_confirmed_repositories() {
    let repos = popularity_curve(2_000, 20_000);
    let with_manifest = repos.iter().map(|r| r.id).filter(|id| id % 3 == 0);
    let index = InMemoryIndex::new(repos.clone()).with_manifests(with_manifest);
    let searcher = Searcher::connect(index, SearchOptions::default(), None).await;
    let mut session = SearchSession::new();

    let report = tokio::time::timeout(
        SEARCH_TIMEOUT,
        searcher.find_with_star_repartition(&mut session, 8, true, None),
    )
    .await
    .expect("search should not hang");

    assert_eq!(report.found, session.len());
    assert!(report.found > 0);
    assert!(session.results().iter().all(|r| r.id % 3 == 0));
    assert_distinct(session.results());
}

#[tokio::test]
async fn failing_listings_never_add_unchecked_repositories() {
    let index = InMemoryIndex {
        listings_failing: true,
        ..InMemoryIndex::new(popularity_curve(100, 1_000))
    };
    let searcher = Searcher::with_ceiling(index, SearchOptions::default(), 1_000);
    let mut session = SearchSession::new();

    let found = searcher.find(&mut session, 10, true, None).await;

    assert_eq!(found, 0);
    assert!(session.is_empty());
    // The aborted filter pass ends pagination of the range.
    assert_eq!(searcher.client().searches(), 1);
}

#[tokio::test]
async fn sessions_are_independent_and_deduplicate_across_calls() {
    let searcher = Searcher::with_ceiling(
        InMemoryIndex::new(popularity_curve(300, 3_000)),
        SearchOptions::default(),
        3_000,
    );

    let mut first = SearchSession::new();
    assert_eq!(searcher.find(&mut first, 150, false, None).await, 150);
    assert_eq!(searcher.find(&mut first, 150, false, None).await, 150);
    assert_eq!(searcher.find(&mut first, 150, false, None).await, 0);
    assert_eq!(first.len(), 300);
    assert_distinct(first.results());

    let mut second = SearchSession::new();
    assert_eq!(searcher.find(&mut second, 10, false, None).await, 10);
    assert_eq!(second.len(), 10);
}

#[tokio::test]
async fn post_hoc_filter_keeps_only_manifest_repositories() {
    let index =
        InMemoryIndex::new(popularity_curve(40, 4_000)).with_manifests([2, 4, 8, 16, 32]);
    let searcher = Searcher::with_ceiling(index, SearchOptions::default(), 4_000);
    let mut session = SearchSession::new();
    searcher.find(&mut session, 40, false, None).await;

    let report = searcher.filter_manifest(&mut session, None).await;

    assert!(report.complete);
    assert_eq!(report.checked, 40);
    assert_eq!(report.removed, 35);
    let ids: Vec<u64> = session.results().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 4, 8, 16, 32]);

    // Removed repositories may be found again.
    assert_eq!(searcher.find(&mut session, 100, false, None).await, 35);
}

#[tokio::test]
async fn progress_reports_found_line_per_range() {
    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let capture = Arc::clone(&events);
    let callback: ProgressCallback = Box::new(move |event| {
        if matches!(event, SearchProgress::RangeSearched { .. }) {
            capture.lock().unwrap().push(event.to_string());
        }
    });

    let searcher = Searcher::with_ceiling(
        InMemoryIndex::new(popularity_curve(1_000, 10_000)),
        SearchOptions::default(),
        10_000,
    );
    let mut session = SearchSession::new();
    let report = searcher
        .find_with_star_repartition(&mut session, 4, false, Some(&callback))
        .await;

    let events = events.lock().unwrap();
    assert_eq!(events.len(), report.ranges.len());
    assert_eq!(events.last().map(String::as_str), Some("Found: 4/4"));
}

#[tokio::test]
async fn total_counts_cover_ranges_and_language() {
    let searcher = Searcher::with_ceiling(
        InMemoryIndex::new(popularity_curve(100, 1_000)),
        SearchOptions::default(),
        1_000,
    );

    assert_eq!(searcher.total_repository_count_all().await.unwrap(), 100);
    // Stars above 100 belong to repositories 1 through 9.
    let upper = searcher
        .total_repository_count(StarRange::new(101, 1_000).unwrap())
        .await
        .unwrap();
    assert_eq!(upper, 9);
}
