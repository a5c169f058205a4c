//! Strata CLI - popularity-stratified repository sampling.

mod commands;
mod config;
#[cfg(feature = "github")]
mod output;
#[cfg(feature = "github")]
mod progress;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "github")]
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Sample repositories across popularity strata")]
#[command(
    long_about = "Strata samples repositories of one language from GitHub search, spreading \
the sample across star counts instead of returning only the most popular projects. \
Search results are capped at 1000 per query, so the star axis is cut into successive \
ranges, each contributing a share of the sample. Repositories can be restricted to \
those with a build manifest (such as pom.xml) at their root."
)]
#[command(after_long_help = r#"EXAMPLES
    Sample 50 Java repositories across all popularity levels:
        $ strata sample 50

    Keep only Gradle projects, checking each candidate while searching:
        $ strata sample 20 --language kotlin --manifest build.gradle.kts --check-manifest

    Sample first, then filter by manifest:
        $ strata filter 20 --manifest pom.xml

    Count Java repositories with 100 to 500 stars:
        $ strata count --min 100 --max 500

    Generate shell completions:
        $ strata completions bash > ~/.local/share/bash-completion/completions/strata

CONFIGURATION
    Strata reads configuration from:
      1. ~/.config/strata/config.toml (or $XDG_CONFIG_HOME/strata/config.toml)
      2. ./strata.toml in the current directory
      3. Environment variables (STRATA_* prefix, e.g., STRATA_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    STRATA_GITHUB_TOKEN       GitHub personal access token (anonymous if unset)
    STRATA_GITHUB_API_URL     API base URL (default: https://api.github.com)
    RUST_LOG                  Log filter for non-interactive output
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample repositories spread across star ranges
    #[cfg(feature = "github")]
    Sample {
        #[command(flatten)]
        search: SearchArgs,

        /// Check every candidate for the manifest file while searching
        #[arg(short = 'c', long)]
        check_manifest: bool,
    },
    /// Sample repositories, then drop those without the manifest file
    #[cfg(feature = "github")]
    Filter {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Count repositories of a language, optionally within a star range
    #[cfg(feature = "github")]
    Count {
        /// Lowest star count (inclusive)
        #[arg(long)]
        min: Option<u64>,

        /// Highest star count (inclusive)
        #[arg(long)]
        max: Option<u64>,

        /// Repository language (default from config or java)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Show GitHub API rate limit status
    #[cfg(feature = "github")]
    Limits {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Options shared by the sampling commands.
#[cfg(feature = "github")]
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SearchArgs {
    /// Number of repositories to sample
    pub number: usize,

    /// Repository language (default from config or java)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Manifest file required at the repository root (default from config or pom.xml)
    #[arg(short, long)]
    pub manifest: Option<String>,

    /// Search the whole star range at once instead of repartitioning
    #[arg(long)]
    pub flat: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Progress bars replace log output on a TTY
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("strata=info,strata_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();
    let cli = Cli::parse();

    #[cfg(not(feature = "github"))]
    let _ = &config;

    match cli.command {
        #[cfg(feature = "github")]
        Commands::Sample {
            search,
            check_manifest,
        } => commands::sample::handle_sample(&search, check_manifest, &config).await?,
        #[cfg(feature = "github")]
        Commands::Filter { search } => commands::sample::handle_filter(&search, &config).await?,
        #[cfg(feature = "github")]
        Commands::Count {
            min,
            max,
            language,
        } => commands::count::handle_count(min, max, language.as_deref(), &config).await?,
        #[cfg(feature = "github")]
        Commands::Limits { output } => commands::limits::handle_limits(output, &config).await?,
        Commands::Completions { shell } => commands::meta::handle_completions(shell)?,
    }

    Ok(())
}
