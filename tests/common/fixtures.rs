//! Service and config fixtures built on the crate's `test_utils`.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ccdu::core::service::UsageService;
use ccdu::storage::Config;

pub use ccdu::test_utils::*;
pub use ccdu::{assert_contains, assert_float_eq};

/// Backoff step short enough to keep retry tests fast.
pub const FAST_BACKOFF: Duration = Duration::from_millis(10);

/// A service pointed at `tool_path` with a fast backoff.
pub fn service_for_path(tool_path: &str) -> Arc<UsageService> {
    service_with(test_config(tool_path))
}

/// A service built from `config` with a fast backoff.
pub fn service_with(config: Config) -> Arc<UsageService> {
    Arc::new(
        UsageService::new(&config)
            .expect("test config is valid")
            .with_backoff_step(FAST_BACKOFF),
    )
}

/// A service pointed at a fake tool.
#[cfg(unix)]
pub fn service_for(tool: &FakeTool) -> Arc<UsageService> {
    service_for_path(tool.path_str())
}

/// Write `config` as TOML into `dir` and return the file path.
pub fn write_config(dir: &TestDir, config: &Config) -> std::path::PathBuf {
    let path = dir.file_path("config.toml");
    config.save_to(&path).expect("config written");
    path
}
