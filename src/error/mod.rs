//! Error types for ccdu.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are classified into kinds that drive how a refresh cycle ends:
//! - **Unavailable**: the usage tool is missing, not executable, or kept failing
//! - **InvocationFailure**: a single run exited non-zero or timed out (retryable)
//! - **ParseFailure**: the tool printed malformed JSON
//! - **NoDataToday**: the tool works but has no record for the current date
//! - **AnomalousZeroValues**: today's record reports zero tokens and zero cost
//! - **ValidationFailure**: bad caller input, rejected without state changes
//! - **Configuration**: config file parse or value errors
//! - **Internal**: I/O, serialization, or unclassified errors
//!
//! Each error has a stable error code (e.g., `CCDU-U001`) for programmatic handling.

pub mod suggestions;

use thiserror::Error;

pub use suggestions::FixSuggestion;

// =============================================================================
// Error Kinds
// =============================================================================

/// High-level error kinds for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Tool path empty, not found, not executable, or retries exhausted.
    Unavailable,
    /// Non-zero exit, timeout, or spawn failure of a resolvable binary.
    InvocationFailure,
    /// Malformed JSON from the tool.
    ParseFailure,
    /// Valid response without a record for today.
    NoDataToday,
    /// Today's record is present but all-zero.
    AnomalousZeroValues,
    /// Bad caller input.
    ValidationFailure,
    /// Config file issues.
    Configuration,
    /// Unexpected errors.
    Internal,
}

impl ErrorKind {
    /// Returns a human-readable description of the kind.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Unavailable => "Usage tool unavailable",
            Self::InvocationFailure => "Usage tool invocation failed",
            Self::ParseFailure => "Invalid usage tool output",
            Self::NoDataToday => "No usage data for today",
            Self::AnomalousZeroValues => "Anomalous zero usage values",
            Self::ValidationFailure => "Validation error",
            Self::Configuration => "Configuration error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this kind.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Unavailable => "U",
            Self::InvocationFailure => "I",
            Self::ParseFailure => "P",
            Self::NoDataToday => "D",
            Self::AnomalousZeroValues => "Z",
            Self::ValidationFailure => "V",
            Self::Configuration => "C",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes for the `ccdu` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Usage tool missing or unusable
    ToolUnavailable = 2,
    /// Parse, validation, or config errors
    ParseError = 3,
    /// Usage tool timed out
    Timeout = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

/// Main error type for ccdu operations.
#[derive(Error, Debug)]
pub enum CcduError {
    // ==========================================================================
    // Availability errors (Kind: Unavailable)
    // ==========================================================================
    /// The availability check rejected the configured tool path.
    #[error("usage tool is not available: {path}")]
    ToolUnavailable { path: String },

    /// The tool path could not be resolved to an executable.
    #[error("usage tool not found: {0}")]
    ToolNotFound(String),

    /// Every attempt of a refresh cycle failed to invoke the tool.
    #[error("usage tool unavailable after {attempts} attempt(s): {source}")]
    Unavailable {
        attempts: u32,
        #[source]
        source: Box<CcduError>,
    },

    // ==========================================================================
    // Invocation errors (Kind: InvocationFailure)
    // ==========================================================================
    /// The tool exited with a non-zero status.
    #[error("usage tool command failed with exit code {exit_code}: {output}")]
    CommandFailed {
        path: String,
        exit_code: i32,
        output: String,
    },

    /// The tool did not finish within the command timeout.
    #[error("usage tool timed out after {seconds}s: {path}")]
    Timeout { path: String, seconds: u64 },

    /// The tool could not be started or its output could not be read.
    #[error("failed to run usage tool {path}: {reason}")]
    Spawn { path: String, reason: String },

    // ==========================================================================
    // Response errors
    // ==========================================================================
    /// The tool printed output that is not the expected JSON.
    #[error("failed to parse usage tool output: {0}")]
    ParseResponse(String),

    /// The response has no record for today.
    #[error("usage tool has no data for today ({date})")]
    NoDataToday { date: String },

    /// Today's record reports zero tokens and zero cost.
    #[error("usage tool returned zero values for {date}")]
    ZeroValues { date: String },

    // ==========================================================================
    // Caller input errors (Kind: ValidationFailure)
    // ==========================================================================
    /// Rejected caller input.
    #[error("validation error: {0}")]
    Validation(String),

    // ==========================================================================
    // Configuration errors (Kind: Configuration)
    // ==========================================================================
    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error parsing the configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    // ==========================================================================
    // Internal errors (Kind: Internal)
    // ==========================================================================
    /// The local clock moved backwards past the last reset.
    #[error("system clock moved backwards: last reset {last_reset}, now {now}")]
    ClockSkew { last_reset: String, now: String },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CcduError {
    /// Map error to a process exit code.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::ToolUnavailable { .. } | Self::ToolNotFound(_) => ExitCode::ToolUnavailable,
            Self::Unavailable { source, .. } => match source.exit_code() {
                ExitCode::Timeout => ExitCode::Timeout,
                _ => ExitCode::ToolUnavailable,
            },

            Self::ParseResponse(_)
            | Self::ZeroValues { .. }
            | Self::Validation(_)
            | Self::Config(_)
            | Self::ConfigParse { .. } => ExitCode::ParseError,

            Self::Timeout { .. } => ExitCode::Timeout,

            // A working tool with no usage yet is not a failure of the process.
            Self::NoDataToday { .. } => ExitCode::Success,

            Self::CommandFailed { .. }
            | Self::Spawn { .. }
            | Self::ClockSkew { .. }
            | Self::Io(_)
            | Self::Json(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error kind used to classify refresh outcomes.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ToolUnavailable { .. } | Self::ToolNotFound(_) | Self::Unavailable { .. } => {
                ErrorKind::Unavailable
            }
            Self::CommandFailed { .. } | Self::Timeout { .. } | Self::Spawn { .. } => {
                ErrorKind::InvocationFailure
            }
            Self::ParseResponse(_) => ErrorKind::ParseFailure,
            Self::NoDataToday { .. } => ErrorKind::NoDataToday,
            Self::ZeroValues { .. } => ErrorKind::AnomalousZeroValues,
            Self::Validation(_) => ErrorKind::ValidationFailure,
            Self::Config(_) | Self::ConfigParse { .. } => ErrorKind::Configuration,
            Self::ClockSkew { .. } | Self::Io(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `CCDU-{kind}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ToolUnavailable { .. } => "CCDU-U001",
            Self::ToolNotFound(_) => "CCDU-U002",
            Self::Unavailable { .. } => "CCDU-U003",

            Self::CommandFailed { .. } => "CCDU-I001",
            Self::Timeout { .. } => "CCDU-I002",
            Self::Spawn { .. } => "CCDU-I003",

            Self::ParseResponse(_) => "CCDU-P001",
            Self::NoDataToday { .. } => "CCDU-D001",
            Self::ZeroValues { .. } => "CCDU-Z001",

            Self::Validation(_) => "CCDU-V001",

            Self::Config(_) => "CCDU-C001",
            Self::ConfigParse { .. } => "CCDU-C002",

            Self::ClockSkew { .. } => "CCDU-X003",
            Self::Io(_) => "CCDU-X001",
            Self::Json(_) => "CCDU-X002",
        }
    }

    /// Returns whether another attempt within the same refresh cycle may succeed.
    ///
    /// Only invocation failures and the availability gate are retried; a
    /// malformed or all-zero response is not expected to self-correct.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ToolUnavailable { .. }
                | Self::ToolNotFound(_)
                | Self::CommandFailed { .. }
                | Self::Timeout { .. }
                | Self::Spawn { .. }
        )
    }

    /// Returns the tool path if this error names one.
    #[must_use]
    pub fn tool_path(&self) -> Option<&str> {
        match self {
            Self::ToolUnavailable { path }
            | Self::CommandFailed { path, .. }
            | Self::Timeout { path, .. }
            | Self::Spawn { path, .. } => Some(path),
            Self::ToolNotFound(path) => Some(path),
            Self::Unavailable { source, .. } => source.tool_path(),
            _ => None,
        }
    }

    /// Returns actionable fix suggestions for this error.
    ///
    /// # Example
    ///
    /// ```
    /// use ccdu::error::CcduError;
    ///
    /// let err = CcduError::ToolNotFound("ccusage".to_string());
    /// let suggestions = err.fix_suggestions();
    /// assert!(!suggestions.is_empty());
    /// ```
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self {
            Self::ToolUnavailable { path } | Self::ToolNotFound(path) => {
                suggestions::tool_missing_suggestions(path)
            }
            Self::Unavailable { source, .. } => source.fix_suggestions(),
            Self::CommandFailed {
                path, exit_code, ..
            } => suggestions::command_failed_suggestions(path, *exit_code),
            Self::Timeout { path, seconds } => suggestions::timeout_suggestions(path, *seconds),
            Self::Spawn { path, reason } => suggestions::spawn_suggestions(path, reason),
            Self::ParseResponse(_) => suggestions::parse_response_suggestions(),
            Self::NoDataToday { date } => suggestions::no_data_today_suggestions(date),
            Self::ZeroValues { date } => suggestions::zero_values_suggestions(date),
            Self::Validation(message) => suggestions::validation_suggestions(message),
            Self::Config(message) => suggestions::config_suggestions(message),
            Self::ConfigParse { path, message } => {
                suggestions::config_parse_suggestions(path, message)
            }
            Self::ClockSkew { .. } => suggestions::clock_skew_suggestions(),
            Self::Io(_) | Self::Json(_) => suggestions::internal_suggestions(),
        }
    }
}

/// Result type alias for ccdu operations.
pub type Result<T> = std::result::Result<T, CcduError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn command_failed() -> CcduError {
        CcduError::CommandFailed {
            path: "/usr/bin/ccusage".to_string(),
            exit_code: 1,
            output: "boom".to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // ErrorKind tests
    // -------------------------------------------------------------------------

    #[test]
    fn error_kind_code_prefix_is_unique() {
        let kinds = [
            ErrorKind::Unavailable,
            ErrorKind::InvocationFailure,
            ErrorKind::ParseFailure,
            ErrorKind::NoDataToday,
            ErrorKind::AnomalousZeroValues,
            ErrorKind::ValidationFailure,
            ErrorKind::Configuration,
            ErrorKind::Internal,
        ];
        let prefixes: HashSet<_> = kinds.iter().map(ErrorKind::code_prefix).collect();
        assert_eq!(prefixes.len(), kinds.len());
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(format!("{}", ErrorKind::NoDataToday), "No usage data for today");
        assert_eq!(format!("{}", ErrorKind::Unavailable), "Usage tool unavailable");
    }

    // -------------------------------------------------------------------------
    // Classification tests
    // -------------------------------------------------------------------------

    #[test]
    fn refresh_errors_have_expected_kinds() {
        assert_eq!(
            CcduError::ToolUnavailable { path: String::new() }.kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(command_failed().kind(), ErrorKind::InvocationFailure);
        assert_eq!(
            CcduError::ParseResponse("eof".to_string()).kind(),
            ErrorKind::ParseFailure
        );
        assert_eq!(
            CcduError::NoDataToday { date: "2026-01-01".to_string() }.kind(),
            ErrorKind::NoDataToday
        );
        assert_eq!(
            CcduError::ZeroValues { date: "2026-01-01".to_string() }.kind(),
            ErrorKind::AnomalousZeroValues
        );
        assert_eq!(
            CcduError::Validation("bad".to_string()).kind(),
            ErrorKind::ValidationFailure
        );
    }

    #[test]
    fn exhausted_retries_are_unavailable() {
        let err = CcduError::Unavailable {
            attempts: 3,
            source: Box::new(command_failed()),
        };
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(err.tool_path(), Some("/usr/bin/ccusage"));
        assert!(err.to_string().contains("3 attempt(s)"));
    }

    #[test]
    fn error_codes_are_unique() {
        let codes = vec![
            CcduError::ToolUnavailable { path: String::new() }.error_code(),
            CcduError::ToolNotFound(String::new()).error_code(),
            CcduError::Unavailable {
                attempts: 1,
                source: Box::new(command_failed()),
            }
            .error_code(),
            command_failed().error_code(),
            CcduError::Timeout { path: String::new(), seconds: 5 }.error_code(),
            CcduError::Spawn { path: String::new(), reason: String::new() }.error_code(),
            CcduError::ParseResponse(String::new()).error_code(),
            CcduError::NoDataToday { date: String::new() }.error_code(),
            CcduError::ZeroValues { date: String::new() }.error_code(),
            CcduError::Validation(String::new()).error_code(),
            CcduError::Config(String::new()).error_code(),
            CcduError::ConfigParse { path: String::new(), message: String::new() }.error_code(),
        ];

        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes should be unique");
        for code in codes {
            assert!(code.starts_with("CCDU-"), "{code} should start with CCDU-");
        }
    }

    #[test]
    fn only_invocation_and_availability_errors_are_retryable() {
        assert!(command_failed().is_retryable());
        assert!(CcduError::Timeout { path: String::new(), seconds: 5 }.is_retryable());
        assert!(CcduError::ToolUnavailable { path: String::new() }.is_retryable());

        assert!(!CcduError::ParseResponse(String::new()).is_retryable());
        assert!(!CcduError::ZeroValues { date: String::new() }.is_retryable());
        assert!(!CcduError::NoDataToday { date: String::new() }.is_retryable());
        assert!(!CcduError::Validation(String::new()).is_retryable());
    }

    #[test]
    fn exit_codes_are_correct() {
        assert_eq!(
            CcduError::ToolNotFound("x".to_string()).exit_code(),
            ExitCode::ToolUnavailable
        );
        assert_eq!(
            CcduError::Timeout { path: "x".to_string(), seconds: 5 }.exit_code(),
            ExitCode::Timeout
        );
        assert_eq!(
            CcduError::Unavailable {
                attempts: 3,
                source: Box::new(CcduError::Timeout { path: "x".to_string(), seconds: 5 }),
            }
            .exit_code(),
            ExitCode::Timeout
        );
        assert_eq!(
            CcduError::ParseResponse(String::new()).exit_code(),
            ExitCode::ParseError
        );
        assert_eq!(
            CcduError::NoDataToday { date: String::new() }.exit_code(),
            ExitCode::Success
        );
        assert_eq!(command_failed().exit_code(), ExitCode::GeneralError);
    }

    #[test]
    fn every_error_has_suggestions() {
        let errors = vec![
            CcduError::ToolUnavailable { path: "ccusage".to_string() },
            CcduError::ToolNotFound("ccusage".to_string()),
            command_failed(),
            CcduError::Timeout { path: "ccusage".to_string(), seconds: 5 },
            CcduError::Spawn { path: "ccusage".to_string(), reason: "denied".to_string() },
            CcduError::ParseResponse("eof".to_string()),
            CcduError::NoDataToday { date: "2026-01-01".to_string() },
            CcduError::ZeroValues { date: "2026-01-01".to_string() },
            CcduError::Validation("bad".to_string()),
            CcduError::Config("bad".to_string()),
            CcduError::ConfigParse { path: "c.toml".to_string(), message: "bad".to_string() },
            CcduError::ClockSkew { last_reset: "b".to_string(), now: "a".to_string() },
            CcduError::Io(std::io::Error::other("disk")),
        ];
        for err in errors {
            assert!(
                !err.fix_suggestions().is_empty(),
                "{} should have suggestions",
                err.error_code()
            );
        }
    }
}
