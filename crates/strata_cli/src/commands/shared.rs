//! Client construction shared by the search commands.

use strata::{GitHubError, GitHubIndexClient, RateLimitedIndex};

use crate::config::Config;

/// GitHub client from configuration, anonymous when no token is set.
pub(crate) fn github_client(config: &Config) -> Result<GitHubIndexClient, GitHubError> {
    let token = config.github_token();
    if token.is_none() {
        tracing::debug!("No GitHub token configured, searching anonymously");
    }
    GitHubIndexClient::new(
        token.as_deref(),
        &config.github_api_url(),
        config.request_timeout(),
    )
}

/// GitHub client paced to the configured request rate.
pub(crate) fn paced_github_client(
    config: &Config,
) -> Result<RateLimitedIndex<GitHubIndexClient>, GitHubError> {
    let client = github_client(config)?;
    Ok(RateLimitedIndex::new(
        client,
        config.search.requests_per_second,
    ))
}
