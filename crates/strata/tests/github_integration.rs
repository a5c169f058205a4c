//! Integration tests for the GitHub index client.
//!
//! A fake transport answers search and contents requests the way the GitHub
//! REST API does, so the searcher runs end to end without network access.

#![cfg(feature = "github")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use strata::github::{GITHUB_API_URL, GitHubIndexClient};
use strata::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use strata::index::{IndexClient, IndexError, RepositorySummary, StarRange};
use strata::search::{SearchOptions, SearchSession, Searcher};
use url::Url;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

struct FakeRepo {
    id: u64,
    name: String,
    stars: u64,
    has_pom: bool,
}

/// Serves `/search/repositories` and `/repos/{owner}/{name}/contents`.
struct FakeGitHub {
    repos: Vec<FakeRepo>,
    /// Answer every search with an exhausted rate limit.
    exhausted: bool,
    urls: Mutex<Vec<String>>,
}

impl FakeGitHub {
    fn new(repos: Vec<FakeRepo>) -> Self {
        Self {
            repos,
            exhausted: false,
            urls: Mutex::new(Vec::new()),
        }
    }

    fn json(status: u16, body: serde_json::Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("x-ratelimit-limit".to_string(), "30".to_string()),
                ("x-ratelimit-remaining".to_string(), "29".to_string()),
                ("x-ratelimit-reset".to_string(), "1700000000".to_string()),
            ],
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    /// Parse `language:<l> stars:<min>..<max>` qualifiers.
    fn star_range(q: &str) -> Option<StarRange> {
        let stars = q.split(' ').find_map(|term| term.strip_prefix("stars:"))?;
        let (min, max) = stars.split_once("..")?;
        StarRange::new(min.parse().ok()?, max.parse().ok()?)
    }

    fn search(&self, url: &Url) -> HttpResponse {
        if self.exhausted {
            let mut response =
                Self::json(403, serde_json::json!({"message": "API rate limit exceeded"}));
            for (name, value) in response.headers.iter_mut() {
                if name.as_str() == "x-ratelimit-remaining" {
                    *value = "0".to_string();
                }
            }
            return response;
        }

        let param = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default()
        };
        let q = param("q");
        let page: usize = param("page").parse().unwrap_or(1);
        let per_page: usize = param("per_page").parse().unwrap_or(30);
        let range = Self::star_range(&q);

        let mut matched: Vec<&FakeRepo> = self
            .repos
            .iter()
            .filter(|r| range.is_none_or(|range| range.contains(r.stars)))
            .collect();
        if param("sort") == "stars" {
            matched.sort_by(|a, b| b.stars.cmp(&a.stars));
        }

        let items: Vec<serde_json::Value> = matched
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .map(|r| {
                serde_json::json!({
                    "id": r.id,
                    "name": r.name,
                    "full_name": format!("acme/{}", r.name),
                    "owner": {"login": "acme"},
                    "stargazers_count": r.stars,
                    "language": "Java",
                    "default_branch": "main",
                    "description": null,
                    "html_url": format!("https://github.com/acme/{}", r.name),
                    "updated_at": "2024-05-01T12:00:00Z"
                })
            })
            .collect();

        Self::json(
            200,
            serde_json::json!({
                "total_count": matched.len(),
                "incomplete_results": false,
                "items": items
            }),
        )
    }

    fn contents(&self, name: &str) -> HttpResponse {
        match self.repos.iter().find(|r| r.name == name) {
            Some(repo) => {
                let mut entries = vec![serde_json::json!({"name": "README.md", "type": "file"})];
                if repo.has_pom {
                    entries.push(serde_json::json!({"name": "pom.xml", "type": "file"}));
                }
                Self::json(200, serde_json::Value::Array(entries))
            }
            None => Self::json(404, serde_json::json!({"message": "Not Found"})),
        }
    }
}

#[async_trait]
impl HttpTransport for FakeGitHub {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.urls.lock().unwrap().push(request.url.clone());
        let url = Url::parse(&request.url).map_err(|e| HttpError::Transport(e.to_string()))?;
        let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();

        match segments.as_slice() {
            ["search", "repositories"] => Ok(self.search(&url)),
            ["repos", _owner, name, "contents"] => Ok(self.contents(name)),
            _ => Ok(Self::json(404, serde_json::json!({"message": "Not Found"}))),
        }
    }
}

fn fake_repos() -> Vec<FakeRepo> {
    (1..=250)
        .map(|id| FakeRepo {
            id,
            name: format!("service-{id}"),
            stars: 25_000 / id,
            has_pom: id % 2 == 0,
        })
        .collect()
}

fn client(fake: Arc<FakeGitHub>) -> GitHubIndexClient {
    GitHubIndexClient::new_with_transport(Some("ghp_test"), GITHUB_API_URL, fake).unwrap()
}

#[tokio::test]
async fn searcher_samples_through_github_client() {
    let fake = Arc::new(FakeGitHub::new(fake_repos()));
    let searcher = Searcher::connect(client(Arc::clone(&fake)), SearchOptions::default(), None).await;
    assert_eq!(searcher.ceiling_stars(), 25_000);

    let mut session = SearchSession::new();
    let report = tokio::time::timeout(
        SEARCH_TIMEOUT,
        searcher.find_with_star_repartition(&mut session, 6, true, None),
    )
    .await
    .expect("search should not hang");

    assert_eq!(report.found, 6);
    assert!(session.results().iter().all(|r| r.id % 2 == 0));
    assert!(
        session
            .results()
            .iter()
            .all(|r: &RepositorySummary| r.owner == "acme")
    );

    let urls = fake.urls.lock().unwrap();
    assert!(urls.iter().any(|u| u.contains("/contents")));
    assert!(
        urls.iter()
            .filter(|u| u.contains("/search/repositories"))
            .all(|u| u.contains("order=desc"))
    );
}

#[tokio::test]
async fn total_count_reads_github_total() {
    let fake = Arc::new(FakeGitHub::new(fake_repos()));
    let searcher = Searcher::with_ceiling(client(fake), SearchOptions::default(), 25_000);

    assert_eq!(searcher.total_repository_count_all().await.unwrap(), 250);
    assert_eq!(
        searcher
            .total_repository_count(StarRange::new(1_000, 25_000).unwrap())
            .await
            .unwrap(),
        25
    );
}

#[tokio::test]
async fn exhausted_rate_limit_surfaces_as_rate_limited() {
    let fake = Arc::new(FakeGitHub {
        exhausted: true,
        ..FakeGitHub::new(fake_repos())
    });
    let github = client(fake);

    let err = github.max_stars("java").await.unwrap_err();
    assert!(matches!(err, IndexError::RateLimited { .. }));
}

#[tokio::test(start_paused = true)]
async fn searcher_gives_up_after_retry_budget() {
    let fake = Arc::new(FakeGitHub {
        exhausted: true,
        ..FakeGitHub::new(fake_repos())
    });
    let options = SearchOptions::default().with_max_retries(2);
    let searcher = Searcher::with_ceiling(client(Arc::clone(&fake)), options, 25_000);
    let mut session = SearchSession::new();

    let found = searcher.find(&mut session, 5, false, None).await;

    assert_eq!(found, 0);
    // One attempt plus two retries.
    assert_eq!(fake.urls.lock().unwrap().len(), 3);
}
