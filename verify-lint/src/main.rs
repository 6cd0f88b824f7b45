//! Lint verifier.
//!
//! Runs `npx eslint .` in the current directory, relays its output, and exits
//! 0 only when it passed cleanly.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use verify_lint::exit_codes;
use verify_lint::io::config::LintConfig;
use verify_lint::logging;
use verify_lint::verify::verify_lint;

#[derive(Parser)]
#[command(
    name = "verify-lint",
    version,
    about = "Run the project linter and exit non-zero on any finding"
)]
struct Cli {}

fn main() {
    if let Err(err) = Cli::try_parse() {
        let code = parse_exit_code(&err);
        let _ = err.print();
        std::process::exit(code);
    }
    logging::init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FAILED);
        }
    }
}

fn run() -> Result<i32> {
    let cwd = std::env::current_dir().context("resolve current directory")?;
    let config = LintConfig::default();
    let outcome = verify_lint(&cwd, &config, &mut io::stdout(), &mut io::stderr())?;
    Ok(outcome.exit_code())
}

/// `--help`/`--version` succeed; any other parse error is a failure, never clap's code 2.
fn parse_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::PASSED,
        _ => exit_codes::FAILED,
    }
}
