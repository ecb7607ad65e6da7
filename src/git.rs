//! Git command wrappers.
//!
//! Every command is scoped to a working copy with `--git-dir` and
//! `--work-tree`, so nothing depends on the process's current directory.

use crate::config::Config;
use crate::constants::GIT_DIR;
use crate::process::{self, CommandError, Invocation};
use colored::Colorize;
use std::path::Path;

/// Called with every git invocation right before it runs.
pub type GitLogger = fn(&Invocation);

pub fn verbose_logger(invocation: &Invocation) {
    eprintln!("    {} {}", "$".dimmed(), invocation.to_string().dimmed());
}

pub fn no_op_logger(_invocation: &Invocation) {}

/// Builds a git invocation scoped to the working copy at `repo`.
pub fn git_command(program: &str, repo: &Path, subcommand: &[&str]) -> Invocation {
    let mut args = vec![
        format!("--git-dir={}", repo.join(GIT_DIR).display()),
        format!("--work-tree={}", repo.display()),
    ];
    args.extend(subcommand.iter().map(|arg| arg.to_string()));
    Invocation::new(program, args)
}

/// Runs a scoped git command and returns its stdout.
pub fn run_git(
    repo: &Path,
    config: &Config,
    args: &[&str],
    log: GitLogger,
) -> Result<String, CommandError> {
    let invocation = git_command(&config.git_program, repo, args);
    log(&invocation);
    process::run(&invocation).into_result(&invocation)
}

pub fn validate_branch_name(branch: &str) -> anyhow::Result<()> {
    if branch.contains('\0') || branch.contains('\n') || branch.trim().is_empty() {
        anyhow::bail!("Invalid branch name: {:?}", branch);
    }
    Ok(())
}

pub fn current_branch(
    repo: &Path,
    config: &Config,
    log: GitLogger,
) -> Result<String, CommandError> {
    run_git(repo, config, &["rev-parse", "--abbrev-ref", "HEAD"], log)
        .map(|stdout| stdout.trim().to_string())
}

/// Whether `branch` appears in the local or remote branch listing.
pub fn branch_exists(
    repo: &Path,
    config: &Config,
    branch: &str,
    log: GitLogger,
) -> Result<bool, CommandError> {
    let listing = run_git(repo, config, &["branch", "-a"], log)?;
    Ok(listing_has_branch(&listing, branch, config))
}

/// Scans `git branch -a` output for a well-formed line ending in `branch`.
///
/// Suffix matching lets `remotes/origin/foo` satisfy `foo` without parsing
/// remote prefixes. It also lets `bar-foo` satisfy `foo`.
pub fn listing_has_branch(listing: &str, branch: &str, config: &Config) -> bool {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| config.patterns.is_branch_line(line))
        .any(|line| line.ends_with(branch))
}

pub fn fetch(repo: &Path, config: &Config, log: GitLogger) -> Result<(), CommandError> {
    run_git(repo, config, &["fetch"], log)?;
    Ok(())
}

pub fn checkout(
    repo: &Path,
    config: &Config,
    branch: &str,
    log: GitLogger,
) -> Result<(), CommandError> {
    run_git(repo, config, &["checkout", branch], log)?;
    Ok(())
}

pub fn pull(repo: &Path, config: &Config, log: GitLogger) -> Result<(), CommandError> {
    run_git(repo, config, &["pull"], log)?;
    Ok(())
}
