// Repository discovery, per-repository checkout, workspace fan-out

use crate::config::Config;
use crate::git;
use crate::process::CommandError;
use anyhow::Context;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// A working copy selected from the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Absolute path of the working copy.
    pub path: PathBuf,
    /// Directory name within the base directory.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStep {
    Fetching,
    Probing,
    CheckingOutTarget { branch: String },
    CheckingOutDefault { branch: String },
    Pulling,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutStep::Fetching => write!(f, "Fetching"),
            CheckoutStep::Probing => write!(f, "Looking for branch"),
            CheckoutStep::CheckingOutTarget { branch } => write!(f, "Checking out {}", branch),
            CheckoutStep::CheckingOutDefault { branch } => {
                write!(f, "Falling back to {}", branch)
            }
            CheckoutStep::Pulling => write!(f, "Pulling"),
        }
    }
}

/// Observer hooks for a checkout. All methods default to doing nothing.
///
/// Hooks are invoked from worker threads, one repository per thread.
pub trait CheckoutCallbacks {
    fn on_start(&self, _repo: &Repository) {}
    fn on_step(&self, _repo: &Repository, _step: &CheckoutStep) {}
    fn on_complete(&self, _result: &CheckoutResult) {}
}

#[derive(Debug)]
pub struct CheckoutResult {
    pub path: PathBuf,
    pub outcome: CheckoutOutcome,
    pub duration: Duration,
}

impl CheckoutResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CheckoutOutcome::Success(_))
    }

    /// The single line (or diagnostic block) reported for this repository.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.outcome {
            CheckoutOutcome::Success(success) => format!(
                "Checked out {:?} in {:?}",
                success.branch,
                self.path.display().to_string()
            ),
            CheckoutOutcome::Failed(failure) => failure.error.clone(),
        }
    }
}

impl fmt::Display for CheckoutResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug)]
pub enum CheckoutOutcome {
    Success(CheckoutSuccess),
    Failed(CheckoutFailure),
}

#[derive(Debug)]
pub struct CheckoutSuccess {
    /// Branch left checked out.
    pub branch: String,
    /// Whether the requested branch was missing and the default was used.
    pub fell_back: bool,
}

#[derive(Debug)]
pub struct CheckoutFailure {
    pub error: String,
    pub step: CheckoutStep,
}

#[derive(Debug)]
struct CheckoutError {
    source: CommandError,
    step: CheckoutStep,
}

/// Lists the immediate subdirectories of `base` whose names are eligible.
///
/// Failing to read `base` is fatal; a subdirectory that is not a working
/// copy is still returned and fails at its own fetch.
pub fn find_repositories(base: &Path, config: &Config) -> anyhow::Result<Vec<Repository>> {
    let base = std::path::absolute(base)
        .with_context(|| format!("Failed to resolve directory {}", base.display()))?;
    let entries = std::fs::read_dir(&base)
        .with_context(|| format!("Failed to read directory {}", base.display()))?;

    let mut repos = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read entry in {}", base.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to stat {}", entry.path().display()))?;
        if !file_type.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if config.patterns.is_repo_name(&name) {
            repos.push(Repository {
                path: base.join(&name),
                name,
            });
        }
    }

    repos.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(repos)
}

fn at_step<T>(step: CheckoutStep, result: Result<T, CommandError>) -> Result<T, CheckoutError> {
    result.map_err(|source| CheckoutError { source, step })
}

/// Fetches `repo`, then checks out `target` if it exists or the configured
/// default branch (followed by a pull) if it does not.
///
/// The first failing command ends the checkout; nothing is retried.
pub fn checkout<C>(
    repo: &Repository,
    target: &str,
    config: &Config,
    callbacks: &C,
) -> CheckoutResult
where
    C: CheckoutCallbacks + ?Sized,
{
    let start = Instant::now();
    callbacks.on_start(repo);

    let outcome = match do_checkout(repo, target, config, callbacks) {
        Ok(success) => CheckoutOutcome::Success(success),
        Err(e) => CheckoutOutcome::Failed(CheckoutFailure {
            error: e.source.to_string(),
            step: e.step,
        }),
    };

    let result = CheckoutResult {
        path: repo.path.clone(),
        outcome,
        duration: start.elapsed(),
    };
    callbacks.on_complete(&result);
    result
}

fn do_checkout<C>(
    repo: &Repository,
    target: &str,
    config: &Config,
    callbacks: &C,
) -> Result<CheckoutSuccess, CheckoutError>
where
    C: CheckoutCallbacks + ?Sized,
{
    let log = config.git_logger();
    let path = repo.path.as_path();
    let enter = |step: CheckoutStep| {
        callbacks.on_step(repo, &step);
        step
    };

    at_step(enter(CheckoutStep::Fetching), git::fetch(path, config, log))?;

    let exists = at_step(
        enter(CheckoutStep::Probing),
        git::branch_exists(path, config, target, log),
    )?;

    if exists {
        at_step(
            enter(CheckoutStep::CheckingOutTarget {
                branch: target.to_string(),
            }),
            git::checkout(path, config, target, log),
        )?;
        return Ok(CheckoutSuccess {
            branch: target.to_string(),
            fell_back: false,
        });
    }

    let default_branch = config.default_branch.as_str();
    at_step(
        enter(CheckoutStep::CheckingOutDefault {
            branch: default_branch.to_string(),
        }),
        git::checkout(path, config, default_branch, log),
    )?;
    at_step(enter(CheckoutStep::Pulling), git::pull(path, config, log))?;

    Ok(CheckoutSuccess {
        branch: default_branch.to_string(),
        fell_back: true,
    })
}

/// Checks out `target` in every repository at once, one thread each.
///
/// Results are handed to `on_result` on the calling thread in completion
/// order, and exactly one result per repository is returned.
pub fn checkout_workspace<C, F>(
    repos: &[Repository],
    target: &str,
    config: &Config,
    callbacks: &C,
    mut on_result: F,
) -> anyhow::Result<Vec<CheckoutResult>>
where
    C: CheckoutCallbacks + Sync + ?Sized,
    F: FnMut(&CheckoutResult),
{
    if repos.is_empty() {
        return Ok(Vec::new());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(repos.len())
        .thread_name(|i| format!("checkout-{i}"))
        .build()
        .context("Failed to create checkout thread pool")?;

    let (sender, receiver) = mpsc::channel();
    let results = pool.in_place_scope(|scope| {
        for repo in repos {
            let sender = sender.clone();
            scope.spawn(move |_| {
                // The receiver is only dropped after all tasks have finished.
                let _ = sender.send(checkout(repo, target, config, callbacks));
            });
        }
        drop(sender);

        let mut results = Vec::with_capacity(repos.len());
        for _ in 0..repos.len() {
            let Ok(result) = receiver.recv() else {
                break;
            };
            on_result(&result);
            results.push(result);
        }
        results
    });

    Ok(results)
}
