//! Pure logic for deciding and reporting a lint verdict.
//!
//! Core modules must be free of process and filesystem side effects.

pub mod outcome;
