//! Shared helpers for integration tests.
//!
//! - `fixtures`: fake `ccusage` binaries and services wired to them
//! - `log_capture`: per-thread tracing capture for asserting on log output

pub mod fixtures;
pub mod log_capture;
