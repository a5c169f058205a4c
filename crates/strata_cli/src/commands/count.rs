//! `strata count`.

use std::sync::Arc;

use strata::index::UNBOUNDED_STARS;
use strata::{Searcher, StarRange};

use crate::commands::shared::paced_github_client;
use crate::config::Config;
use crate::progress::ProgressReporter;

/// Print how many repositories of a language the index holds, optionally
/// within a star range.
pub(crate) async fn handle_count(
    min: Option<u64>,
    max: Option<u64>,
    language: Option<&str>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = config.search_options(language, None);
    let language = options.language.clone();
    let client = paced_github_client(config)?;

    let count = match (min, max) {
        (None, None) => {
            let reporter = Arc::new(ProgressReporter::new());
            let callback = reporter.as_callback();
            let searcher = Searcher::connect(client, options, Some(&*callback)).await;
            reporter.finish();
            searcher.total_repository_count_all().await?
        }
        (min, Some(max)) => {
            let range = requested_range(min, max)?;
            let searcher = Searcher::with_ceiling(client, options, max);
            searcher.total_repository_count(range).await?
        }
        (Some(min), None) => {
            let range = requested_range(Some(min), UNBOUNDED_STARS)?;
            let searcher = Searcher::with_ceiling(client, options, UNBOUNDED_STARS);
            searcher.total_repository_count(range).await?
        }
    };

    println!("{}", describe(count, &language, min, max));
    Ok(())
}

fn requested_range(min: Option<u64>, max: u64) -> Result<StarRange, String> {
    let min = min.unwrap_or(0);
    StarRange::new(min, max).ok_or_else(|| format!("--min ({min}) must not exceed --max ({max})"))
}

fn describe(count: u64, language: &str, min: Option<u64>, max: Option<u64>) -> String {
    match (min, max) {
        (None, None) => format!("{count} {language} repositories"),
        (Some(min), None) => format!("{count} {language} repositories with at least {min} stars"),
        (min, Some(max)) => format!(
            "{count} {language} repositories with {}..{max} stars",
            min.unwrap_or(0)
        ),
    }
}
