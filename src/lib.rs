//! ccdu - Claude Code daily usage monitor
//!
//! Polls the `ccusage` CLI for today's token count and cost, keeps the last
//! good result in a shared snapshot, and derives an alert status from cost
//! thresholds. A polling loop and a midnight reset loop run against the same
//! [`core::UsageService`].

// Note: deny (not forbid) to allow #[allow(unsafe_code)] in test helpers for env var manipulation
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod core;
pub mod error;
pub mod render;
pub mod storage;
pub mod util;

/// Test utilities module - included in test builds or when test-utils feature is enabled.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{CcduError, ExitCode, Result};

// Re-export test utilities for external test crates
#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::*;
