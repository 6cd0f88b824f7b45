//! Orchestration for a single lint run: invoke, classify, report.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::outcome::{Invocation, LaunchFailure, LintOutcome, classify};
use crate::io::config::LintConfig;
use crate::io::process::{build_command, run_command};

/// Run the configured lint command once in `workdir`.
///
/// A spawn error, timeout, or capture overflow becomes a `LaunchFailure`;
/// a command that ran to completion yields an `Invocation` whatever its status.
pub fn invoke(workdir: &Path, config: &LintConfig) -> Result<Invocation, LaunchFailure> {
    let cmd = build_command(&config.command, workdir).map_err(failure_from)?;
    let output = run_command(cmd, config.timeout(), config.output_limit_bytes)
        .map_err(failure_from)?;

    if output.timed_out {
        return Err(LaunchFailure {
            stdout: output.stdout_text(),
            message: format!(
                "command timed out after {}s",
                config.timeout_secs.unwrap_or_default()
            ),
        });
    }
    for (stream, truncated) in [
        ("stdout", output.stdout_truncated),
        ("stderr", output.stderr_truncated),
    ] {
        if truncated > 0 {
            return Err(LaunchFailure {
                stdout: output.stdout_text(),
                message: format!("{stream} maxBuffer length exceeded"),
            });
        }
    }

    Ok(Invocation {
        stdout: output.stdout_text(),
        stderr: output.stderr_text(),
        success: output.status.success(),
        code: output.status.code(),
    })
}

/// Print the banner, run the lint command, and report the verdict.
///
/// The returned outcome carries the exit code; errors only cover an invalid
/// `config` and failures to write the report itself.
pub fn verify_lint<O: Write, E: Write>(
    workdir: &Path,
    config: &LintConfig,
    out: &mut O,
    err: &mut E,
) -> Result<LintOutcome> {
    config.validate().context("invalid lint config")?;
    writeln!(out, "Running {}...\n", config.tool_name).context("write banner")?;
    out.flush().context("flush banner")?;

    let outcome = classify(&config.command_line(), invoke(workdir, config));
    info!(exit_code = outcome.exit_code(), "lint finished");
    outcome.report(out, err).context("write lint report")?;
    Ok(outcome)
}

fn failure_from(err: anyhow::Error) -> LaunchFailure {
    LaunchFailure::new(format!("{err:#}"))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::outcome::{FAILURE_LABEL, FINDINGS_LABEL, SUCCESS_LINE};
    use crate::exit_codes;
    use crate::test_support::script_config;
    use std::time::{Duration, Instant};

    fn run(config: &LintConfig) -> (LintOutcome, String, String) {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = verify_lint(temp.path(), config, &mut out, &mut err).expect("verify");
        (
            outcome,
            String::from_utf8(out).expect("utf8 stdout"),
            String::from_utf8(err).expect("utf8 stderr"),
        )
    }

    #[test]
    fn silent_success_prints_banner_and_success_line() {
        let (outcome, out, err) = run(&script_config("exit 0"));
        assert_eq!(outcome.exit_code(), exit_codes::PASSED);
        assert_eq!(out, format!("Running ESLint...\n\n{SUCCESS_LINE}\n"));
        assert!(err.is_empty());
    }

    #[test]
    fn stderr_on_success_is_reported_as_findings() {
        let (outcome, out, err) = run(&script_config("echo checked; echo 'rule deprecated' >&2"));
        assert_eq!(outcome.exit_code(), exit_codes::FAILED);
        assert!(out.contains("checked\n"));
        assert!(!out.contains(SUCCESS_LINE));
        assert_eq!(err, format!("{FINDINGS_LABEL}\nrule deprecated\n\n"));
    }

    #[test]
    fn nonzero_exit_reports_failure_with_stderr() {
        let (outcome, _, err) = run(&script_config("echo '3 problems found' >&2; exit 1"));
        assert_eq!(outcome.exit_code(), exit_codes::FAILED);
        assert!(err.starts_with(FAILURE_LABEL));
        assert!(err.contains("3 problems found"));
    }

    #[test]
    fn missing_program_is_a_launch_failure() {
        let config = LintConfig {
            command: vec!["verify-lint-missing-tool-7f3a".to_string()],
            ..LintConfig::default()
        };
        let (outcome, _, err) = run(&config);
        assert!(matches!(outcome, LintOutcome::Failed(_)));
        assert!(err.starts_with(FAILURE_LABEL));
        assert!(err.contains("verify-lint-missing-tool-7f3a"));
    }

    #[test]
    fn oversized_output_is_a_failure() {
        let config = LintConfig {
            output_limit_bytes: 4,
            ..script_config("printf 0123456789")
        };
        let failure = match invoke(Path::new("."), &config) {
            Err(failure) => failure,
            Ok(invocation) => panic!("expected failure, got {invocation:?}"),
        };
        assert_eq!(failure.stdout, "0123");
        assert_eq!(failure.message, "stdout maxBuffer length exceeded");
    }

    #[test]
    fn oversized_output_from_a_long_running_linter_fails_fast() {
        let config = LintConfig {
            output_limit_bytes: 1024,
            ..script_config("head -c 4096 /dev/zero; sleep 5")
        };
        let started = Instant::now();
        let failure = invoke(Path::new("."), &config).expect_err("overflow");
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(failure.message, "stdout maxBuffer length exceeded");
        assert_eq!(failure.stdout.len(), 1024);
    }

    #[test]
    fn invalid_config_is_rejected_before_banner() {
        let config = LintConfig {
            command: Vec::new(),
            ..LintConfig::default()
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = verify_lint(Path::new("."), &config, &mut out, &mut err);
        assert!(result.is_err());
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn timeout_is_a_failure() {
        let config = LintConfig {
            timeout_secs: Some(1),
            ..script_config("exec sleep 5")
        };
        let failure = invoke(Path::new("."), &config).expect_err("timeout");
        assert_eq!(failure.message, "command timed out after 1s");
    }
}
