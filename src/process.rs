//! External process execution.
//!
//! Runs a program to completion and captures its output. A non-zero exit or
//! a failed launch is reported in the returned [`Execution`], never raised.

use std::fmt;
use std::process::{Command, ExitStatus};

/// A program and its arguments, built fresh for every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The full argument vector, program first.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Captured output of a finished (or unlaunchable) process.
#[derive(Debug, Clone, Default)]
pub struct Execution {
    pub stdout: String,
    pub stderr: String,
    /// Why the process did not succeed; `None` on a zero exit status.
    pub failure: Option<String>,
}

impl Execution {
    #[must_use]
    pub fn ok(&self) -> bool {
        self.failure.is_none()
    }

    /// Converts a failed execution into a [`CommandError`] describing it.
    pub fn into_result(self, invocation: &Invocation) -> Result<String, CommandError> {
        if self.ok() {
            return Ok(self.stdout);
        }
        Err(CommandError {
            command: invocation.to_string(),
            stdout: self.stdout,
            stderr: self.stderr,
            cause: self.failure.unwrap_or_default(),
        })
    }
}

/// A command that failed to launch or exited unsuccessfully.
#[derive(Debug, Clone, thiserror::Error)]
#[error("When running [{command}]:\n{stdout}\n{stderr}\n{cause}")]
pub struct CommandError {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub cause: String,
}

pub fn run(invocation: &Invocation) -> Execution {
    let output = match Command::new(&invocation.program)
        .args(&invocation.args)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            return Execution {
                failure: Some(format!("Failed to spawn {}: {}", invocation.program, e)),
                ..Execution::default()
            };
        }
    };

    Execution {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        failure: (!output.status.success()).then(|| describe_status(output.status)),
    }
}

/// Renders an unsuccessful exit as `exit status <code>`.
/// Processes killed by a signal have no code and keep the platform wording.
fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {code}"),
        None => status.to_string(),
    }
}
