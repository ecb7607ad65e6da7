//! Branch synchronizer for a directory of git working copies.
//!
//! For every repository directly under a base directory this crate:
//! - Fetches from the remote
//! - Checks out the requested branch if any local or remote branch matches it
//! - Otherwise checks out the default branch and pulls

pub mod config;
pub mod constants;
pub mod git;
pub mod output;
pub mod process;
pub mod repo;
