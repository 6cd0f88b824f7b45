//! Test-only helpers for scripting a stand-in lint command.

use std::env;
use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};

use crate::io::config::LintConfig;

/// Config whose command runs `script` through `sh -c`.
pub fn script_config(script: &str) -> LintConfig {
    LintConfig {
        command: vec!["sh".to_string(), "-c".to_string(), script.to_string()],
        ..LintConfig::default()
    }
}

/// Write an executable `npx` shell script with `body` into `dir`.
#[cfg(unix)]
pub fn install_stub_npx(dir: &Path, body: &str) -> Result<std::path::PathBuf> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("npx");
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))
        .with_context(|| format!("write {}", path.display()))?;
    let mut perms = fs::metadata(&path)
        .with_context(|| format!("stat {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).with_context(|| format!("chmod {}", path.display()))?;
    Ok(path)
}

/// `PATH` value with `dir` searched before the inherited entries.
pub fn path_with_first(dir: &Path) -> Result<OsString> {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = env::var_os("PATH") {
        paths.extend(env::split_paths(&existing));
    }
    env::join_paths(paths).context("join PATH")
}
