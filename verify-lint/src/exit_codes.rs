//! Stable exit codes for the `verify-lint` binary.

/// Lint command succeeded and wrote nothing to stderr.
pub const PASSED: i32 = 0;
/// Lint reported findings, the command could not be run, or the wrapper itself failed.
pub const FAILED: i32 = 1;
