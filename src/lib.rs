//! Stack trace → commit attribution.
//!
//! Resolves the source frames of a managed-runtime stack trace and, for each
//! frame's file and line, walks the file's patch history to report every
//! commit whose hunks touched that line position.

pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod pattern;
pub mod report;
pub mod routes;
pub mod trace;
