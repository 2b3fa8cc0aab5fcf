//! Fix suggestion database for ccdu errors.
//!
//! Provides actionable fix suggestions mapped to specific error types,
//! including commands, context explanations, and prevention tips.

// =============================================================================
// Fix Suggestion Types
// =============================================================================

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct FixSuggestion {
    /// Primary fix commands in order of preference.
    /// These should be copy-paste ready for the terminal.
    pub commands: Vec<String>,

    /// Explanation of why this error occurred.
    pub context: String,

    /// Tips to prevent this error in the future.
    pub prevention: Option<String>,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }
}

/// Installation commands for the usage tool.
#[must_use]
pub fn install_commands() -> Vec<String> {
    vec![
        "npm install -g ccusage".to_string(),
        "# Or run without installing: npx ccusage@latest daily --json".to_string(),
    ]
}

// =============================================================================
// Availability
// =============================================================================

pub(crate) fn tool_missing_suggestions(path: &str) -> Vec<FixSuggestion> {
    let mut commands = install_commands();
    commands.push("ccdu check".to_string());
    vec![
        FixSuggestion::new(
            commands,
            format!("The usage tool '{path}' could not be resolved to an executable file."),
        )
        .with_prevention(
            "Set tool_path in the config file to an absolute path, or make sure the tool is on PATH.",
        ),
    ]
}

// =============================================================================
// Invocation
// =============================================================================

pub(crate) fn command_failed_suggestions(path: &str, exit_code: i32) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("{path} daily --json")],
        format!(
            "The usage tool exited with code {exit_code}. Run it directly to see the full error output."
        ),
    )]
}

pub(crate) fn timeout_suggestions(path: &str, seconds: u64) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("time {path} daily --json")],
            format!("The usage tool did not finish within {seconds}s."),
        )
        .with_prevention("Increase cmd_timeout in the config file (maximum 60 seconds)."),
    ]
}

pub(crate) fn spawn_suggestions(path: &str, reason: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("ls -l {path}")],
        format!("The usage tool could not be started: {reason}."),
    )]
}

// =============================================================================
// Response
// =============================================================================

pub(crate) fn parse_response_suggestions() -> Vec<FixSuggestion> {
    let mut commands = vec!["ccusage daily --json".to_string()];
    commands.extend(install_commands());
    vec![
        FixSuggestion::new(
            commands,
            "The usage tool printed output that is not the expected daily JSON report. \
             An outdated version may print a different format.",
        ),
    ]
}

pub(crate) fn no_data_today_suggestions(date: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        Vec::new(),
        format!("No usage has been recorded for {date} yet. This is normal at the start of a day."),
    )]
}

pub(crate) fn zero_values_suggestions(date: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["ccusage daily --json".to_string()],
        format!(
            "The usage tool reported zero tokens and zero cost for {date}, which usually means \
             it could not read the session logs."
        ),
    )]
}

// =============================================================================
// Input and configuration
// =============================================================================

pub(crate) fn validation_suggestions(message: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        Vec::new(),
        format!("The value was rejected: {message}."),
    )]
}

pub(crate) fn config_suggestions(message: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["ccdu config show".to_string(), "ccdu config path".to_string()],
        format!("The configuration is invalid: {message}."),
    )]
}

pub(crate) fn config_parse_suggestions(path: &str, message: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("$EDITOR {path}"), "ccdu config init --force".to_string()],
            format!("The config file could not be parsed: {message}."),
        )
        .with_prevention("Regenerate the file with `ccdu config init` to get a valid template."),
    ]
}

pub(crate) fn clock_skew_suggestions() -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec!["timedatectl status".to_string()],
            "The system clock is earlier than the last daily reset, so the reset was skipped.",
        )
        .with_prevention("Keep the clock synchronized with NTP."),
    ]
}

pub(crate) fn internal_suggestions() -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["ccdu --verbose status".to_string()],
        "An unexpected error occurred. Verbose logs may show more detail.",
    )]
}
