//! Progress bar, colored output, and summary formatting.
//!
//! Outcome lines are the only thing written to stdout. Everything else
//! (progress, verbose step traces, the summary) goes to stderr.

use crate::config::Config;
use crate::constants::PROGRESS_TICK_MS;
use crate::repo::{CheckoutCallbacks, CheckoutOutcome, CheckoutResult, CheckoutStep, Repository};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// No-op callbacks for when progress tracking is not needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl CheckoutCallbacks for NoOpCallbacks {}

/// Traces every state transition in verbose mode.
///
/// Checkouts run concurrently, so each line carries the repository name.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerboseCallbacks;

impl CheckoutCallbacks for VerboseCallbacks {
    fn on_start(&self, repo: &Repository) {
        eprintln!("{}", format!("[{}]", repo.name).white().bold());
    }

    fn on_step(&self, repo: &Repository, step: &CheckoutStep) {
        eprintln!("  {} {}...", format!("[{}]", repo.name).dimmed(), step);
    }

    fn on_complete(&self, result: &CheckoutResult) {
        let name = repo_name(&result.path);
        if result.is_success() {
            eprintln!("  {} {} done", "✓".green(), name);
        } else {
            eprintln!("  {} {} failed", "✗".red(), name);
        }
    }
}

/// Progress tracker for a workspace checkout.
/// Hidden in quiet and verbose modes, where it would only get in the way.
pub struct WorkspaceProgress {
    bar: ProgressBar,
    failed: AtomicUsize,
}

impl WorkspaceProgress {
    /// Prints one outcome line to stdout and advances the bar.
    pub fn report(&self, result: &CheckoutResult) {
        self.bar.suspend(|| print_outcome(result));
        self.bar.inc(1);

        if !result.is_success() {
            let failed = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
            self.bar
                .set_message(format!("│ {} failed", failed).red().to_string());
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Creates a progress bar showing the completion count.
#[must_use]
pub fn create_workspace_progress(total: usize, config: &Config) -> WorkspaceProgress {
    let bar = if config.is_quiet() || config.is_verbose() || total == 0 {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} checked out {spinner:.cyan} {msg}")
        {
            bar.set_style(style.progress_chars("█░"));
        }
        bar.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        bar
    };

    WorkspaceProgress {
        bar,
        failed: AtomicUsize::new(0),
    }
}

pub fn print_outcome(result: &CheckoutResult) {
    println!("{}", result);
}

/// Announces the run on stderr. An empty base directory prints nothing.
pub fn print_working_dir(path: &Path, branch: &str, count: usize, config: &Config) {
    if config.is_quiet() || count == 0 {
        return;
    }
    eprintln!(
        "{} {} {} {}",
        "Checking out".cyan(),
        branch.white().bold(),
        "in".cyan(),
        path.display().to_string().white().bold()
    );
    if config.is_verbose() {
        eprintln!("{}", format!("Found {} repositories", count).dimmed());
    }
}

pub fn print_summary(results: &[CheckoutResult], duration: Duration, config: &Config) {
    if config.is_quiet() || results.is_empty() {
        return;
    }
    eprintln!("{}", format_summary(results, duration));
}

fn format_summary(results: &[CheckoutResult], duration: Duration) -> String {
    let succeeded = results.iter().filter(|r| r.is_success()).count();
    let fell_back = results
        .iter()
        .filter(|r| matches!(&r.outcome, CheckoutOutcome::Success(s) if s.fell_back))
        .count();

    let mut summary = format!(
        "{}: {}/{} repos in {}",
        "Total".white().bold(),
        succeeded,
        results.len(),
        format_duration(duration)
    );
    if fell_back > 0 {
        summary.push_str(&format!(" ({} on default branch)", fell_back).yellow().to_string());
    }
    summary
}

fn repo_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repository")
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{CheckoutFailure, CheckoutSuccess};
    use std::path::PathBuf;

    fn success(path: &str, branch: &str, fell_back: bool) -> CheckoutResult {
        CheckoutResult {
            path: PathBuf::from(path),
            outcome: CheckoutOutcome::Success(CheckoutSuccess {
                branch: branch.to_string(),
                fell_back,
            }),
            duration: Duration::from_secs(1),
        }
    }

    fn failure(path: &str) -> CheckoutResult {
        CheckoutResult {
            path: PathBuf::from(path),
            outcome: CheckoutOutcome::Failed(CheckoutFailure {
                error: "boom".to_string(),
                step: CheckoutStep::Fetching,
            }),
            duration: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_format_duration_rounds_to_two_decimals() {
        assert_eq!(format_duration(Duration::from_millis(1234)), "1.23s");
        assert_eq!(format_duration(Duration::from_secs(42)), "42.00s");
    }

    #[test]
    fn test_summary_counts_successes_and_fallbacks() {
        colored::control::set_override(false);
        let results = [
            success("/w/a", "dev", false),
            success("/w/b", "master", true),
            failure("/w/c"),
        ];
        assert_eq!(
            format_summary(&results, Duration::from_millis(1500)),
            "Total: 2/3 repos in 1.50s (1 on default branch)"
        );
    }

    #[test]
    fn test_repo_name_uses_last_component() {
        assert_eq!(repo_name(Path::new("/w/api")), "api");
        assert_eq!(repo_name(Path::new("/")), "repository");
    }

    #[test]
    fn test_hidden_progress_reports_without_panicking() -> anyhow::Result<()> {
        let mut config = Config::new()?;
        config.verbosity = crate::config::Verbosity::Quiet;
        let progress = create_workspace_progress(2, &config);
        progress.report(&success("/w/a", "dev", false));
        progress.report(&failure("/w/b"));
        progress.finish();
        assert_eq!(progress.failed.load(Ordering::Relaxed), 1);
        Ok(())
    }
}
