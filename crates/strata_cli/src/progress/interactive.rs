use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use strata::SearchProgress;

/// Consolidated progress state to avoid multiple mutex locks.
#[derive(Default)]
struct ProgressState {
    /// Found/requested bar for the whole search.
    search_bar: Option<ProgressBar>,
    /// Spinner following the range and page being fetched.
    page_spinner: Option<ProgressBar>,
    /// Counter of manifest checks.
    manifest_bar: Option<ProgressBar>,
    /// Manifest checks that found the file.
    manifests_found: usize,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn handle(&self, event: SearchProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            SearchProgress::CeilingResolved { fallback: true, .. } => {
                self.warn(&event.to_string());
            }

            SearchProgress::CeilingResolved { .. } => {
                let _ = self.multi.println(format!("  {event}"));
            }

            SearchProgress::Started { requested, .. } => {
                let bar = self.multi.add(ProgressBar::new(requested as u64));
                bar.set_style(Self::bar_style());
                bar.set_prefix("Sample");
                state.search_bar = Some(bar);

                let spinner = self.multi.add(ProgressBar::new_spinner());
                spinner.set_style(Self::spinner_style());
                spinner.set_prefix("Search");
                spinner.enable_steady_tick(Duration::from_millis(100));
                state.page_spinner = Some(spinner);
            }

            SearchProgress::FetchedPage { .. } => {
                let spinner = state.page_spinner.get_or_insert_with(|| {
                    let spinner = self.multi.add(ProgressBar::new_spinner());
                    spinner.set_style(Self::spinner_style());
                    spinner.set_prefix("Search");
                    spinner.enable_steady_tick(Duration::from_millis(100));
                    spinner
                });
                spinner.set_message(event.to_string());
            }

            SearchProgress::ManifestChecked { present, .. } => {
                if present {
                    state.manifests_found += 1;
                }
                let found = state.manifests_found;
                let bar = state.manifest_bar.get_or_insert_with(|| {
                    let bar = self.multi.add(ProgressBar::new_spinner());
                    bar.set_style(Self::counter_style());
                    bar.set_prefix("Manifest");
                    bar.enable_steady_tick(Duration::from_millis(100));
                    bar
                });
                bar.inc(1);
                bar.set_message(format!("checked, {found} with manifest"));
            }

            SearchProgress::RangeSearched { range, found, .. } => {
                if let Some(ref bar) = state.search_bar {
                    bar.set_position(found as u64);
                    bar.set_message(format!("stars {range}"));
                }
            }

            SearchProgress::RangeExhausted { .. } => {
                let _ = self.multi.println(format!("  {event}"));
            }

            SearchProgress::SearchAborted { .. }
            | SearchProgress::FilterIncomplete { .. }
            | SearchProgress::RateLimitBackoff { .. } => {
                self.warn(&event.to_string());
            }

            SearchProgress::Finished { found, .. } => {
                if let Some(ref spinner) = state.page_spinner {
                    spinner.finish_and_clear();
                }
                if let Some(ref bar) = state.search_bar {
                    bar.set_position(found as u64);
                    bar.finish_with_message("done");
                }
            }

            _ => {}
        }
    }

    fn warn(&self, message: &str) {
        let _ = self
            .multi
            .println(format!("  {} {}", console::style("!").yellow().bold(), message));
    }

    /// Finish all progress bars.
    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ref pb) = state.page_spinner
            && !pb.is_finished()
        {
            pb.finish_and_clear();
        }
        if let Some(ref pb) = state.search_bar
            && !pb.is_finished()
        {
            pb.finish();
        }
        if let Some(ref pb) = state.manifest_bar
            && !pb.is_finished()
        {
            pb.finish();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn counter_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.yellow} {pos:>4} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
