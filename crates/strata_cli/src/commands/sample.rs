//! `strata sample` and `strata filter`.

use std::sync::Arc;

use console::style;
use serde::Serialize;
use strata::{
    FilterReport, IndexClient, ProgressCallback, SearchReport, SearchSession, Searcher, StarRange,
};

use crate::SearchArgs;
use crate::commands::shared::paced_github_client;
use crate::config::Config;
use crate::output::{OutputFormat, Repository};
use crate::progress::ProgressReporter;

/// JSON document printed with `--output json`.
#[derive(Debug, Serialize)]
struct SampleOutput {
    report: SearchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<FilterReport>,
    repositories: Vec<Repository>,
}

/// Sample repositories, optionally checking each for the manifest inline.
pub(crate) async fn handle_sample(
    args: &SearchArgs,
    check_manifest: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = config.search_options(args.language.as_deref(), args.manifest.as_deref());
    let client = paced_github_client(config)?;

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let searcher = Searcher::connect(client, options, Some(&*callback)).await;
    let mut session = SearchSession::new();
    let report = run_search(&searcher, &mut session, args, check_manifest, &callback).await;
    reporter.finish();

    print_results(&session, report, None, args.output)
}

/// Sample without the inline check, then drop repositories lacking the manifest.
pub(crate) async fn handle_filter(
    args: &SearchArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = config.search_options(args.language.as_deref(), args.manifest.as_deref());
    let client = paced_github_client(config)?;

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let searcher = Searcher::connect(client, options, Some(&*callback)).await;
    let mut session = SearchSession::new();
    let report = run_search(&searcher, &mut session, args, false, &callback).await;
    let filter = searcher.filter_manifest(&mut session, Some(&*callback)).await;
    reporter.finish();

    print_results(&session, report, Some(filter), args.output)
}

async fn run_search<C: IndexClient>(
    searcher: &Searcher<C>,
    session: &mut SearchSession,
    args: &SearchArgs,
    check_manifest: bool,
    callback: &ProgressCallback,
) -> SearchReport {
    if args.flat {
        let found = searcher
            .find(session, args.number, check_manifest, Some(callback))
            .await;
        SearchReport {
            requested: args.number,
            found,
            ranges: vec![StarRange::up_to(searcher.ceiling_stars())],
        }
    } else {
        searcher
            .find_with_star_repartition(session, args.number, check_manifest, Some(callback))
            .await
    }
}

fn print_results(
    session: &SearchSession,
    report: SearchReport,
    filter: Option<FilterReport>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let repositories: Vec<Repository> = session.results().iter().map(Repository::from).collect();

    match format {
        OutputFormat::Json => {
            let output = SampleOutput {
                report,
                filter,
                repositories,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            let summary = summary_lines(&report, filter.as_ref());
            if !repositories.is_empty() {
                let mut table = tabled::Table::new(repositories);
                table.with(tabled::settings::Style::rounded());
                println!("{}", table);
            }
            for line in summary {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn summary_lines(report: &SearchReport, filter: Option<&FilterReport>) -> Vec<String> {
    let mut lines = vec![format!(
        "Found {}/{} repositories across {} star ranges",
        report.found,
        report.requested,
        report.ranges.len()
    )];

    if !report.is_complete() {
        lines.push(
            style(format!(
                "Shortfall: {} repositories could not be found",
                report.shortfall()
            ))
            .yellow()
            .to_string(),
        );
    }

    if let Some(filter) = filter {
        lines.push(format!(
            "Manifest filter: checked {}, removed {}, kept {}",
            filter.checked, filter.removed, filter.kept
        ));
        if !filter.complete {
            lines.push(
                style("Manifest filter incomplete: unchecked repositories were kept")
                    .yellow()
                    .to_string(),
            );
        }
    }

    lines
}
