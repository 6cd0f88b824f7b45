//! Settings for the lint invocation.
//!
//! The binary always runs with `LintConfig::default()`; nothing is read from
//! disk or the environment. Library callers and tests build their own.

use std::time::Duration;

use anyhow::{Result, anyhow};

/// Default per-stream capture limit (1 MiB).
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1024 * 1024;

/// Lint command settings.
///
/// Defaults run `npx eslint .` with no timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    /// Name shown in the `Running ...` banner.
    pub tool_name: String,

    /// Program and arguments to run (e.g. `["npx","eslint","."]`).
    pub command: Vec<String>,

    /// Kill the command after this many seconds. Unset means wait forever.
    pub timeout_secs: Option<u64>,

    /// Capture at most this many bytes per stream; more kills the command.
    pub output_limit_bytes: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            tool_name: "ESLint".to_string(),
            command: vec!["npx".to_string(), "eslint".to_string(), ".".to_string()],
            timeout_secs: None,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }
}

impl LintConfig {
    pub fn validate(&self) -> Result<()> {
        if self.command.is_empty() || self.command[0].trim().is_empty() {
            return Err(anyhow!("command must be a non-empty array"));
        }
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Command rendered as a single line, used in failure messages.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}
