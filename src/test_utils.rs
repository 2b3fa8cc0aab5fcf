//! Test utilities for ccdu.
//!
//! Provides report factories, fake `ccusage` executables, and assertion
//! macros for use across all test modules.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ccdu::test_utils::*;
//!
//! let tool = FakeTool::success_today(1_500, 12.5);
//! let config = test_config(tool.path_str());
//! assert_eq!(tool.invocations(), 0);
//! ```

use chrono::Local;
use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use crate::storage::config::Config;

// =============================================================================
// Report Factories
// =============================================================================

/// Today's local date as `YYYY-MM-DD`.
#[must_use]
pub fn today_str() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// A `ccusage daily --json` report with a single day.
#[must_use]
pub fn make_daily_report(date: &str, tokens: u64, cost: f64) -> String {
    make_report(&[(date, tokens, cost)])
}

/// A `ccusage daily --json` report with the given `(date, tokens, cost)` rows.
#[must_use]
pub fn make_report(days: &[(&str, u64, f64)]) -> String {
    let daily: Vec<serde_json::Value> = days
        .iter()
        .map(|(date, tokens, cost)| {
            serde_json::json!({
                "date": date,
                "inputTokens": tokens / 2,
                "outputTokens": tokens - tokens / 2,
                "totalTokens": tokens,
                "totalCost": cost,
                "modelsUsed": ["claude-sonnet-4"],
            })
        })
        .collect();
    let total_tokens: u64 = days.iter().map(|(_, t, _)| t).sum();
    let total_cost: f64 = days.iter().map(|(_, _, c)| c).sum();

    serde_json::json!({
        "daily": daily,
        "totals": { "totalTokens": total_tokens, "totalCost": total_cost },
    })
    .to_string()
}

/// Config pointing at `tool_path` with a one-second cache window.
#[must_use]
pub fn test_config(tool_path: &str) -> Config {
    Config {
        tool_path: tool_path.to_string(),
        cache_window: 1,
        ..Config::default()
    }
}

// =============================================================================
// Fake ccusage
// =============================================================================

/// A shell script standing in for `ccusage`, living in its own temp dir.
///
/// Every run appends a line to a call log, so tests can count invocations.
#[cfg(unix)]
pub struct FakeTool {
    dir: TestDir,
    path: PathBuf,
}

#[cfg(unix)]
impl FakeTool {
    const NAME: &'static str = "ccusage";
    const REPORT: &'static str = "report.json";
    const CALLS: &'static str = "calls";

    /// Build a script that fails its first `failures` runs, optionally sleeps,
    /// then prints `stdout`.
    ///
    /// # Panics
    ///
    /// Panics if the script cannot be written.
    #[must_use]
    pub fn build(stdout: &str, failures: u32, sleep_secs: u32) -> Self {
        let dir = TestDir::new();
        dir.create_file(Self::REPORT, stdout);

        let root = dir.path().display().to_string();
        let sleep = if sleep_secs > 0 {
            format!("sleep {sleep_secs}\n")
        } else {
            String::new()
        };
        let script = format!(
            "#!/bin/sh\n\
             echo run >> '{root}/{calls}'\n\
             n=$(($(wc -l < '{root}/{calls}')))\n\
             if [ \"$n\" -le {failures} ]; then echo \"ccusage: transient failure $n\" >&2; exit 1; fi\n\
             {sleep}\
             cat '{root}/{report}'\n",
            calls = Self::CALLS,
            report = Self::REPORT,
        );
        let path = dir.file_path(Self::NAME);
        write_executable(&path, &script);
        Self { dir, path }
    }

    /// Prints a report with today's usage.
    #[must_use]
    pub fn success_today(tokens: u64, cost: f64) -> Self {
        Self::build(&make_daily_report(&today_str(), tokens, cost), 0, 0)
    }

    /// Prints `report` verbatim.
    #[must_use]
    pub fn with_report(report: &str) -> Self {
        Self::build(report, 0, 0)
    }

    /// Prints a report that only has yesterday's usage.
    #[must_use]
    pub fn yesterday_only() -> Self {
        let yesterday = (Local::now() - chrono::TimeDelta::days(1))
            .format("%Y-%m-%d")
            .to_string();
        Self::with_report(&make_daily_report(&yesterday, 4_200, 3.5))
    }

    /// Prints a report with an all-zero record for today.
    #[must_use]
    pub fn zero_today() -> Self {
        Self::with_report(&make_daily_report(&today_str(), 0, 0.0))
    }

    /// Prints text that is not JSON.
    #[must_use]
    pub fn malformed() -> Self {
        Self::with_report("Error: no Claude session logs found\n")
    }

    /// Fails `failures` times, then prints today's usage.
    #[must_use]
    pub fn flaky(failures: u32, tokens: u64, cost: f64) -> Self {
        Self::build(&make_daily_report(&today_str(), tokens, cost), failures, 0)
    }

    /// Always exits 1.
    #[must_use]
    pub fn failing() -> Self {
        Self::build("", u32::MAX, 0)
    }

    /// Sleeps before printing today's usage.
    #[must_use]
    pub fn slow(sleep_secs: u32) -> Self {
        Self::build(&make_daily_report(&today_str(), 100, 1.0), 0, sleep_secs)
    }

    /// Replace the printed report; the call log is kept.
    pub fn set_report(&self, report: &str) {
        self.dir.create_file(Self::REPORT, report);
    }

    /// Absolute path of the script.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute path of the script as a string.
    ///
    /// # Panics
    ///
    /// Panics if the temp path is not valid UTF-8.
    #[must_use]
    pub fn path_str(&self) -> &str {
        self.path.to_str().expect("temp path is not UTF-8")
    }

    /// Number of times the script has run.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.dir
            .read_file(Self::CALLS)
            .map_or(0, |calls| calls.lines().count())
    }
}

/// Write `content` to `path` and mark it executable.
///
/// # Panics
///
/// Panics if the file cannot be written.
#[cfg(unix)]
pub fn write_executable(path: &Path, content: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, content).expect("Failed to write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to mark script executable");
}

// =============================================================================
// Temporary Directory
// =============================================================================

/// An isolated temporary directory, removed on drop.
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Create a file in the temporary directory with the given content.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.inner.path().join(name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes())
            .expect("Failed to write test file");
    }

    /// Read a file from the temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.inner.path().join(name))
    }

    /// Get the full path to a file in the temporary directory.
    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a string contains a substring.
///
/// # Examples
///
/// ```rust,ignore
/// use ccdu::assert_contains;
///
/// let text = "Hello, world!";
/// assert_contains!(text, "world");
/// ```
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected string to contain {:?}, but it didn't.\nActual: {:?}",
            needle,
            haystack
        );
    };
}

/// Assert that a string does NOT contain ANSI escape codes.
#[macro_export]
macro_rules! assert_no_ansi_codes {
    ($text:expr) => {
        let text = $text;
        assert!(
            !$crate::test_utils::has_ansi_codes(text),
            "Expected no ANSI escape codes, but found some.\nActual: {:?}",
            text
        );
    };
}

/// Assert two floats are equal within epsilon.
///
/// # Examples
///
/// ```rust,ignore
/// use ccdu::assert_float_eq;
///
/// assert_float_eq!(12.5, 12.5000001);
/// assert_float_eq!(12.5, 12.55, 0.1); // Custom epsilon
/// ```
#[macro_export]
macro_rules! assert_float_eq {
    ($left:expr, $right:expr) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let epsilon: f64 = f64::EPSILON * 100.0;
        assert!(
            (left - right).abs() < epsilon,
            "Float equality assertion failed: {} != {} (epsilon: {})",
            left,
            right,
            epsilon
        );
    };
    ($left:expr, $right:expr, $epsilon:expr) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let epsilon: f64 = $epsilon;
        assert!(
            (left - right).abs() < epsilon,
            "Float equality assertion failed: {} != {} (epsilon: {})",
            left,
            right,
            epsilon
        );
    };
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Check if a string contains ANSI escape sequences.
#[must_use]
pub fn has_ansi_codes(text: &str) -> bool {
    text.contains('\x1b')
}
