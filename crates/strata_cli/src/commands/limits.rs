//! `strata limits`: GitHub rate limit status.

use strata::github::{GitHubRateLimits, RateLimitResource};

use crate::commands::shared::github_client;
use crate::config::Config;
use crate::output::{OutputFormat, print_items};

/// Show the core and search limits for the configured token.
pub(crate) async fn handle_limits(
    output: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = github_client(config)?;
    let limits = client.rate_limit().await?;
    if !client.is_authenticated() {
        tracing::info!("Showing anonymous limits; set STRATA_GITHUB_TOKEN for higher quotas");
    }
    print_items(rate_limits_to_display(&limits), output)?;
    Ok(())
}

/// One rate limit resource as a table row.
#[derive(Debug, Clone, serde::Serialize, tabled::Tabled)]
pub(crate) struct RateLimitDisplay {
    #[tabled(rename = "Resource")]
    pub resource: String,
    #[tabled(rename = "Spent By")]
    pub spent_by: String,
    #[tabled(rename = "Limit")]
    pub limit: usize,
    #[tabled(rename = "Used")]
    pub used: usize,
    #[tabled(rename = "Remaining")]
    pub remaining: usize,
    #[tabled(rename = "Usage %")]
    pub usage_percent: String,
    #[tabled(rename = "Resets At")]
    pub reset_at: String,
    #[tabled(rename = "Resets In")]
    pub reset_in: String,
}

impl RateLimitDisplay {
    fn new(
        name: &str,
        spent_by: &str,
        resource: &RateLimitResource,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let usage = match resource.limit {
            0 => 0.0,
            limit => resource.used as f64 * 100.0 / limit as f64,
        };
        let reset_at = resource.reset_at();
        let until_reset = reset_at.signed_duration_since(now);

        Self {
            resource: name.to_string(),
            spent_by: spent_by.to_string(),
            limit: resource.limit,
            used: resource.used,
            remaining: resource.remaining,
            usage_percent: format!("{usage:.1}%"),
            reset_at: reset_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            reset_in: if until_reset.num_seconds() > 0 {
                format_duration(until_reset)
            } else {
                "now".to_string()
            },
        }
    }
}

/// The two resources a sampling run draws from.
fn rate_limits_to_display(limits: &GitHubRateLimits) -> Vec<RateLimitDisplay> {
    let now = chrono::Utc::now();
    vec![
        RateLimitDisplay::new("search", "searches, counts", &limits.search, now),
        RateLimitDisplay::new("core", "manifest checks", &limits.core, now),
    ]
}

/// Largest unit plus the next one down, e.g. `2m 5s` or `1h`.
fn format_duration(duration: chrono::Duration) -> String {
    let secs = duration.num_seconds().max(0);
    let (major, minor, units) = match secs {
        0..60 => return format!("{secs}s"),
        60..3600 => (secs / 60, secs % 60, ("m", "s")),
        _ => (secs / 3600, secs % 3600 / 60, ("h", "m")),
    };
    if minor == 0 {
        format!("{major}{}", units.0)
    } else {
        format!("{major}{} {minor}{}", units.0, units.1)
    }
}
