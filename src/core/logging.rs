//! Log setup for the `ccdu` binary.
//!
//! Events go to stderr, or to the file named by `CCDU_LOG_FILE`. The level is
//! taken from `--log-level`, then `CCDU_LOG`, then the config file. A set
//! `RUST_LOG` replaces the computed filter entirely.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

pub const LOG_LEVEL_ENV: &str = "CCDU_LOG";
pub const LOG_FORMAT_ENV: &str = "CCDU_LOG_FORMAT";
pub const LOG_FILE_ENV: &str = "CCDU_LOG_FILE";

/// Layout of each log record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Untimed, target-free lines for a terminal.
    #[default]
    Human,
    /// One line per event with its target.
    Compact,
    /// JSONL, one object per event.
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "human" => Some(Self::Human),
            "compact" => Some(Self::Compact),
            "json" | "jsonl" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Minimum level of `ccdu` events that are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Accepted names, as written in the config file.
    pub const NAMES: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];

    /// Parse a level name (case-insensitive, `warning` accepted).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Effective logging settings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// Merge the CLI flags, the `CCDU_LOG*` variables and the config level.
    ///
    /// `--json-output` forces JSON records; `--verbose` lowers the level to
    /// at least debug. Unrecognised names fall through to the next source.
    #[must_use]
    pub fn resolve(
        cli_level: Option<&str>,
        config_level: Option<LogLevel>,
        json_output: bool,
        verbose: bool,
    ) -> Self {
        let level = cli_level
            .and_then(LogLevel::from_name)
            .or_else(|| env_value(LOG_LEVEL_ENV).as_deref().and_then(LogLevel::from_name))
            .or(config_level)
            .unwrap_or_default();
        let level = if verbose { level.min(LogLevel::Debug) } else { level };

        let format = if json_output {
            LogFormat::Json
        } else {
            env_value(LOG_FORMAT_ENV)
                .as_deref()
                .and_then(LogFormat::from_name)
                .unwrap_or_default()
        };

        Self {
            level,
            format,
            file: env_value(LOG_FILE_ENV).map(PathBuf::from),
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directive(&self) -> String {
        format!("ccdu={}", self.level.as_str())
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Install the global subscriber. Returns `false` if one was already set.
///
/// A log file that cannot be opened falls back to stderr with a warning.
pub fn init(settings: &LogSettings) -> bool {
    let mut open_error = None;
    let writer = match settings.file.as_ref().map(|path| {
        OpenOptions::new().create(true).append(true).open(path)
    }) {
        Some(Ok(file)) => BoxMakeWriter::new(file),
        Some(Err(err)) => {
            open_error = Some(err);
            BoxMakeWriter::new(std::io::stderr)
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    let installed = match settings.format {
        LogFormat::Human => builder.with_target(false).without_time().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().with_span_events(FmtSpan::CLOSE).try_init(),
    }
    .is_ok();

    if let (Some(err), Some(path)) = (open_error, settings.file.as_ref()) {
        tracing::warn!(path = %path.display(), error = %err, "cannot open log file, logging to stderr");
    }
    installed
}
