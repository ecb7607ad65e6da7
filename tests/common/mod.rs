//! Test infrastructure for git-branch-sync integration tests.

#![allow(dead_code)]

use anyhow::Result;
use git_branch_sync::config::Config;
use git_branch_sync::git::{self, no_op_logger};
use git_branch_sync::repo::{CheckoutCallbacks, CheckoutStep, Repository};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub fn test_config() -> Config {
    Config::new().expect("patterns compile")
}

/// Runs git inside `dir`, failing the test setup on a non-zero exit.
pub fn git_in(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").current_dir(dir).args(args).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Initializes a repository with one commit on `branch`.
pub fn init_repo(path: &Path, branch: &str) -> Result<()> {
    git_in(path, &["init", "-b", branch])?;
    git_in(path, &["config", "user.email", "test@example.com"])?;
    git_in(path, &["config", "user.name", "Test User"])?;
    std::fs::write(path.join("README.md"), "# Test Repo\n")?;
    git_in(path, &["add", "README.md"])?;
    git_in(path, &["commit", "-m", "Initial commit"])?;
    Ok(())
}

/// A working copy on `master` that tracks a bare remote.
/// Both directories are removed when dropped.
pub struct TestRepo {
    remote: Option<TempDir>,
    _local: TempDir,
    path: PathBuf,
}

impl TestRepo {
    pub fn with_remote() -> Result<Self> {
        let local = TempDir::new()?;
        let path = local.path().join("repo");
        let remote = add_remote(&path)?;
        Ok(Self {
            remote: Some(remote),
            _local: local,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn repository(&self) -> Repository {
        Repository {
            path: self.path.clone(),
            name: "repo".to_string(),
        }
    }

    /// Creates `branch` on the remote only.
    pub fn push_remote_branch(&self, branch: &str) -> Result<()> {
        git_in(&self.path, &["push", "origin", &format!("master:{branch}")])?;
        Ok(())
    }

    pub fn create_branch(&self, branch: &str) -> Result<()> {
        git_in(&self.path, &["branch", branch])?;
        Ok(())
    }

    pub fn current_branch(&self) -> Result<String> {
        Ok(git::current_branch(&self.path, &test_config(), no_op_logger)?)
    }

    /// Deletes the remote so that fetch fails.
    pub fn drop_remote(&mut self) {
        self.remote.take();
    }
}

/// Initializes `path` on master and pushes it to a fresh bare remote.
pub fn add_remote(path: &Path) -> Result<TempDir> {
    std::fs::create_dir_all(path)?;
    let remote = TempDir::new()?;
    git_in(remote.path(), &["init", "--bare"])?;
    init_repo(path, "master")?;
    let url = remote
        .path()
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("non-utf8 temp path"))?;
    git_in(path, &["remote", "add", "origin", url])?;
    git_in(path, &["push", "-u", "origin", "master"])?;
    Ok(remote)
}

/// Creates one tracked repository per name under `workspace`.
/// Returns the remotes, which must be kept alive.
pub fn setup_workspace_with_repos(workspace: &TempDir, names: &[&str]) -> Result<Vec<TempDir>> {
    names
        .iter()
        .map(|name| add_remote(&workspace.path().join(name)))
        .collect()
}

/// Records every step it observes, in order.
#[derive(Clone, Default)]
pub struct RecordingCallbacks {
    pub steps: Arc<Mutex<Vec<CheckoutStep>>>,
}

impl RecordingCallbacks {
    pub fn steps(&self) -> Vec<CheckoutStep> {
        self.steps.lock().unwrap().clone()
    }
}

impl CheckoutCallbacks for RecordingCallbacks {
    fn on_step(&self, _repo: &Repository, step: &CheckoutStep) {
        self.steps.lock().unwrap().push(step.clone());
    }
}

/// Writes a git wrapper that exits 7 when `subcommand` appears among its
/// arguments and defers to the real git otherwise.
#[cfg(unix)]
pub fn git_failing_on(dir: &Path, subcommand: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join(format!("git-failing-on-{subcommand}"));
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\n\
             for arg in \"$@\"; do\n\
             \x20 if [ \"$arg\" = \"{subcommand}\" ]; then echo boom-out; echo boom-err >&2; exit 7; fi\n\
             done\n\
             exec git \"$@\"\n"
        ),
    )?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
    Ok(script)
}
