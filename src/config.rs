//! Configuration types for CLI verbosity and options.

use crate::constants::{BRANCH_LINE_PATTERN, GIT_PROGRAM, MASTER_BRANCH, REPO_NAME_PATTERN};
use crate::git::{self, GitLogger};
use anyhow::Context;
use regex::Regex;

/// Runtime configuration derived from CLI arguments.
///
/// Built once at startup and shared by reference with every repository
/// checkout; nothing in it changes afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Controls the verbosity level of CLI output.
    pub verbosity: Verbosity,
    /// Branch to fall back to when the requested one does not exist.
    pub default_branch: String,
    /// Program used to run git commands.
    pub git_program: String,
    pub patterns: Patterns,
}

impl Config {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            verbosity: Verbosity::default(),
            default_branch: MASTER_BRANCH.to_string(),
            git_program: GIT_PROGRAM.to_string(),
            patterns: Patterns::compile()?,
        })
    }

    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Returns the appropriate git logger based on verbosity settings.
    ///
    /// Config only decides which logger to use; the loggers themselves
    /// live in the git module.
    #[must_use]
    pub fn git_logger(&self) -> GitLogger {
        if self.is_verbose() {
            git::verbose_logger
        } else {
            git::no_op_logger
        }
    }
}

/// Verbosity level for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// The two name filters, compiled once.
#[derive(Debug, Clone)]
pub struct Patterns {
    repo_name: Regex,
    branch_line: Regex,
}

impl Patterns {
    pub fn compile() -> anyhow::Result<Self> {
        let repo_name = Regex::new(REPO_NAME_PATTERN)
            .with_context(|| format!("invalid repository name regex: {REPO_NAME_PATTERN}"))?;
        let branch_line = Regex::new(BRANCH_LINE_PATTERN)
            .with_context(|| format!("invalid branch line regex: {BRANCH_LINE_PATTERN}"))?;
        Ok(Self {
            repo_name,
            branch_line,
        })
    }

    /// Whether a base-directory entry name is eligible for checkout.
    #[must_use]
    pub fn is_repo_name(&self, name: &str) -> bool {
        self.repo_name.is_match(name)
    }

    /// Whether a line of `git branch -a` output names a branch.
    #[must_use]
    pub fn is_branch_line(&self, line: &str) -> bool {
        self.branch_line.is_match(line.trim())
    }
}
