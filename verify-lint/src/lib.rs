//! Run a project's linter once and turn its result into an exit code.
//!
//! The crate keeps a strict split:
//!
//! - **[`core`]**: Pure classification and reporting of a finished run.
//! - **[`io`]**: Side effects (lint settings, child process capture).
//!
//! [`verify`] ties them together for the `verify-lint` binary.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod verify;
