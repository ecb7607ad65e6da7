//! Application-wide constants.
//!
//! Centralized defaults so that branch names and patterns are never buried
//! in the checkout logic.

/// Branch checked out when the requested branch does not exist.
pub const MASTER_BRANCH: &str = "master";

/// Program invoked for every version-control command.
pub const GIT_PROGRAM: &str = "git";

/// Git directory name, relative to a working tree.
pub const GIT_DIR: &str = ".git";

/// Subdirectories of the base directory must match this to be processed.
/// Rejects hidden entries such as `.git` or `.idea`.
pub const REPO_NAME_PATTERN: &str = "^[a-zA-Z0-9].*$";

/// A trimmed `git branch -a` line must match this to be considered a branch.
/// Filters out the current-branch marker and symbolic refs (`HEAD -> ...`).
pub const BRANCH_LINE_PATTERN: &str = "^[a-zA-Z0-9/_-]+$";

/// Progress bar tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;
