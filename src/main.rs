use anyhow::Context;
use clap::Parser;
use git_branch_sync::config::{Config, Verbosity};
use git_branch_sync::constants::MASTER_BRANCH;
use git_branch_sync::git;
use git_branch_sync::output::{self, NoOpCallbacks, VerboseCallbacks};
use git_branch_sync::repo::{self, CheckoutCallbacks};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "git-branch-sync",
    version,
    about = "Check out the same branch in every repository under a directory"
)]
struct Cli {
    /// Where to look for repositories to checkout branches for [default: current directory]
    #[arg(long, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Which branch to checkout [default: branch of the current directory]
    #[arg(long, value_name = "NAME")]
    branch: Option<String>,

    /// Branch to checkout and pull where the requested branch does not exist
    #[arg(long, value_name = "NAME", default_value = MASTER_BRANCH)]
    default_branch: String,

    /// Only print one line per repository
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Trace every git command and step
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;

    git::validate_branch_name(&cli.default_branch)?;
    let config = Config {
        verbosity: cli.verbosity(),
        default_branch: cli.default_branch.clone(),
        ..Config::new()?
    };

    let branch = match cli.branch {
        Some(branch) => branch,
        None => git::current_branch(&cwd, &config, config.git_logger())
            .unwrap_or_else(|_| config.default_branch.clone()),
    };
    git::validate_branch_name(&branch)?;

    let base = match cli.dir {
        Some(dir) => std::path::absolute(&dir)
            .with_context(|| format!("Failed to resolve directory {}", dir.display()))?,
        None => cwd,
    };
    let repos = repo::find_repositories(&base, &config)?;
    output::print_working_dir(&base, &branch, repos.len(), &config);

    let callbacks: &(dyn CheckoutCallbacks + Sync) = if config.is_verbose() {
        &VerboseCallbacks
    } else {
        &NoOpCallbacks
    };

    let start = Instant::now();
    let progress = output::create_workspace_progress(repos.len(), &config);
    let results = repo::checkout_workspace(&repos, &branch, &config, callbacks, |result| {
        progress.report(result)
    })?;
    progress.finish();

    output::print_summary(&results, start.elapsed(), &config);

    Ok(())
}
