//! Classification of a finished lint invocation into a reportable outcome.
//!
//! Everything here is pure: the caller supplies the captured streams and
//! the writers to report to.

use std::io::{self, Write};

use crate::exit_codes;

pub const SUCCESS_LINE: &str = "✓ All linting rules passed!";
pub const FINDINGS_LABEL: &str = "Errors found:";
pub const FAILURE_LABEL: &str = "Linting failed:";

/// Streams and status captured from a lint command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

/// The lint command could not be run, or its run was surfaced as a failure.
///
/// `stdout` holds whatever the command printed before failing and is empty
/// when it never started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchFailure {
    pub stdout: String,
    pub message: String,
}

impl LaunchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            message: message.into(),
        }
    }

    /// Failure for a command that exited with a non-zero status.
    pub fn from_exit(command_line: &str, invocation: Invocation) -> Self {
        Self {
            stdout: invocation.stdout,
            message: format!("Command failed: {command_line}\n{}", invocation.stderr),
        }
    }

    /// Text printed after the failure label: captured stdout wins over the message.
    pub fn detail(&self) -> &str {
        if self.stdout.is_empty() {
            &self.message
        } else {
            &self.stdout
        }
    }
}

/// Final verdict on a lint run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    /// Exit status 0 and nothing on stderr.
    Passed { stdout: String },
    /// Command completed but wrote to stderr.
    FindingsReported { stdout: String, stderr: String },
    /// Command could not be run or exited non-zero.
    Failed(LaunchFailure),
}

/// Decide the outcome of a single invocation.
///
/// Non-zero exits are failures regardless of stderr. A successful exit with
/// any stderr content still counts as findings.
pub fn classify(command_line: &str, result: Result<Invocation, LaunchFailure>) -> LintOutcome {
    let invocation = match result {
        Ok(invocation) => invocation,
        Err(failure) => return LintOutcome::Failed(failure),
    };
    if !invocation.success {
        return LintOutcome::Failed(LaunchFailure::from_exit(command_line, invocation));
    }
    if invocation.stderr.is_empty() {
        LintOutcome::Passed {
            stdout: invocation.stdout,
        }
    } else {
        LintOutcome::FindingsReported {
            stdout: invocation.stdout,
            stderr: invocation.stderr,
        }
    }
}

impl LintOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            LintOutcome::Passed { .. } => exit_codes::PASSED,
            LintOutcome::FindingsReported { .. } | LintOutcome::Failed(_) => exit_codes::FAILED,
        }
    }

    /// Print the outcome: relayed stdout and the success line go to `out`,
    /// labels with stderr or failure text go to `err`.
    pub fn report<O: Write, E: Write>(&self, out: &mut O, err: &mut E) -> io::Result<()> {
        match self {
            LintOutcome::Passed { stdout } => {
                if !stdout.is_empty() {
                    writeln!(out, "{stdout}")?;
                }
                writeln!(out, "{SUCCESS_LINE}")?;
            }
            LintOutcome::FindingsReported { stdout, stderr } => {
                if !stdout.is_empty() {
                    writeln!(out, "{stdout}")?;
                }
                out.flush()?;
                writeln!(err, "{FINDINGS_LABEL}")?;
                writeln!(err, "{stderr}")?;
            }
            LintOutcome::Failed(failure) => {
                writeln!(err, "{FAILURE_LABEL}")?;
                writeln!(err, "{}", failure.detail())?;
            }
        }
        out.flush()?;
        err.flush()
    }
}
