//! Configuration file support for strata.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `STRATA_`, e.g., `STRATA_GITHUB_TOKEN`)
//! 3. Config file (./strata.toml, then ~/.config/strata/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use STRATA_GITHUB_TOKEN env var
//! api_url = "https://api.github.com"
//!
//! [search]
//! language = "java"
//! manifest = "pom.xml"
//! requests_per_second = 1
//! max_retries = 3
//! timeout_secs = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use strata::SearchOptions;
use strata::rate_limits::GITHUB_DEFAULT_RPS;
use strata::search::{DEFAULT_LANGUAGE, DEFAULT_MANIFEST, DEFAULT_MAX_RETRIES};

/// Environment variables for keys that contain underscores.
const ENV_KEYS: &[(&str, &str)] = &[
    ("STRATA_GITHUB_API_URL", "github.api_url"),
    ("STRATA_SEARCH_REQUESTS_PER_SECOND", "search.requests_per_second"),
    ("STRATA_SEARCH_MAX_RETRIES", "search.max_retries"),
    ("STRATA_SEARCH_TIMEOUT_SECS", "search.timeout_secs"),
];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Default search options.
    pub search: SearchConfig,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token. Searches run anonymously without one.
    /// Can also be set via STRATA_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
    /// API base URL, for GitHub Enterprise Server.
    pub api_url: Option<String>,
}

/// Default search options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Language qualifier for every query.
    pub language: String,
    /// File that must sit at the repository root.
    pub manifest: String,
    /// Pace of index requests.
    pub requests_per_second: u32,
    /// Retries for a rate-limited request.
    pub max_retries: usize,
    /// HTTP request timeout.
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
            requests_per_second: GITHUB_DEFAULT_RPS,
            max_retries: DEFAULT_MAX_RETRIES,
            #[cfg(feature = "github")]
            timeout_secs: strata::github::DEFAULT_TIMEOUT_SECS,
            #[cfg(not(feature = "github"))]
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/strata/config.toml)
    /// 3. Local config file (./strata.toml)
    /// 4. Environment variables with STRATA_ prefix
    /// 5. Environment variables for multi-word keys ([`ENV_KEYS`])
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = Self::default_config_path()
            && path.exists()
        {
            tracing::debug!("Loading config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let local_config = PathBuf::from("strata.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./strata.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // STRATA_GITHUB_TOKEN -> github.token
        builder = builder.add_source(
            Environment::with_prefix("STRATA")
                .separator("_")
                .try_parsing(true),
        );

        // Multi-word keys cannot be split on "_", map them explicitly
        for (var, key) in ENV_KEYS {
            let value = std::env::var(var).ok().filter(|v| !v.is_empty());
            builder = match builder.clone().set_override_option(*key, value) {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!("Ignoring {}: {}", var, e);
                    builder
                }
            };
        }

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the GitHub token, ignoring blank values.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// Get the GitHub API base URL.
    #[cfg(feature = "github")]
    pub fn github_api_url(&self) -> String {
        self.github
            .api_url
            .clone()
            .unwrap_or_else(|| strata::github::GITHUB_API_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.search.timeout_secs)
    }

    /// Search options from config, overridden by any CLI flags.
    pub fn search_options(&self, language: Option<&str>, manifest: Option<&str>) -> SearchOptions {
        SearchOptions::default()
            .with_language(language.unwrap_or(&self.search.language))
            .with_manifest(manifest.unwrap_or(&self.search.manifest))
            .with_max_retries(self.search.max_retries)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "strata").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
