use std::collections::HashSet;

use crate::index::RepositorySummary;

/// Repositories accepted during one search session.
///
/// Results keep discovery order and never contain two repositories with the
/// same id. Every search call borrows the session mutably, so independent
/// sessions never share results.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    results: Vec<RepositorySummary>,
    seen: HashSet<u64>,
}

impl SearchSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.seen.contains(&id)
    }

    /// Accepted repositories in discovery order.
    #[must_use]
    pub fn results(&self) -> &[RepositorySummary] {
        &self.results
    }

    #[must_use]
    pub fn into_results(self) -> Vec<RepositorySummary> {
        self.results
    }

    /// Drop repositories already in the session, and repeats within `page`.
    pub(crate) fn retain_unseen(&self, page: Vec<RepositorySummary>) -> Vec<RepositorySummary> {
        let mut page_ids = HashSet::with_capacity(page.len());
        page.into_iter()
            .filter(|repo| !self.seen.contains(&repo.id) && page_ids.insert(repo.id))
            .collect()
    }

    /// Append repositories, skipping known ids. Returns how many were added.
    pub(crate) fn accept(&mut self, repos: impl IntoIterator<Item = RepositorySummary>) -> usize {
        let before = self.results.len();
        for repo in repos {
            if self.seen.insert(repo.id) {
                self.results.push(repo);
            }
        }
        self.results.len() - before
    }

    /// Remove and return every result, leaving the session empty.
    pub(crate) fn take_results(&mut self) -> Vec<RepositorySummary> {
        self.seen.clear();
        std::mem::take(&mut self.results)
    }
}
