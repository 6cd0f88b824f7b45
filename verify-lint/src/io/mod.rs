//! I/O helpers: configuration loading and child process capture.

pub mod config;
pub mod process;
