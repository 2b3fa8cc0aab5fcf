//! Error rendering for ccdu.
//!
//! Provides colored error output with fix suggestions for terminals, plain
//! text for pipes, and structured JSON for robot mode.

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::{CcduError, FixSuggestion};
use crate::util::env::{Stream, color_enabled};

// =============================================================================
// Public API
// =============================================================================

/// Render an error with appropriate formatting.
///
/// JSON format always yields the structured report. Human format uses the
/// detailed colored layout when colors are enabled and stderr is a TTY.
#[must_use]
pub fn render_error(error: &CcduError, format: OutputFormat, no_color: bool) -> String {
    match format {
        OutputFormat::Json => render_error_json(error),
        OutputFormat::Human => {
            if color_enabled(no_color, Stream::Stderr) {
                render_detailed(error)
            } else {
                render_simple(error)
            }
        }
    }
}

/// Render error as structured JSON for machine consumption.
#[must_use]
pub fn render_error_json(error: &CcduError) -> String {
    serde_json::to_string(&ErrorJson::from_error(error)).unwrap_or_else(|_| render_simple(error))
}

// =============================================================================
// Terminal Rendering
// =============================================================================

fn render_detailed(error: &CcduError) -> String {
    let suggestions = error.fix_suggestions();
    let mut lines = vec![format!(
        "{} {}",
        error.to_string().red().bold(),
        format!("[{}]", error.error_code()).dimmed()
    )];

    let commands = suggestion_commands(&suggestions);
    if !commands.is_empty() {
        lines.push(String::new());
        lines.push("How to fix:".bold().to_string());
        for (i, cmd) in commands.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, cmd.cyan()));
        }
    }

    if let Some(first) = suggestions.first() {
        if !first.context.is_empty() {
            lines.push(String::new());
            lines.push("Why this happened:".bold().to_string());
            lines.push(format!("  {}", first.context));
        }
        if let Some(prevention) = &first.prevention {
            lines.push(String::new());
            lines.push("Prevention:".green().to_string());
            lines.push(format!("  {prevention}"));
        }
    }

    lines.join("\n")
}

/// Render error as simple text (no ANSI codes).
fn render_simple(error: &CcduError) -> String {
    let suggestions = error.fix_suggestions();
    let mut lines = vec![format!("Error [{}]: {}", error.error_code(), error)];

    if let Some(cmd) = suggestion_commands(&suggestions).first() {
        lines.push(format!("Fix: {cmd}"));
    }

    lines.join("\n")
}

/// Runnable commands, skipping comment lines.
fn suggestion_commands(suggestions: &[FixSuggestion]) -> Vec<&str> {
    suggestions
        .iter()
        .flat_map(|s| s.commands.iter())
        .map(String::as_str)
        .filter(|cmd| !cmd.starts_with('#'))
        .collect()
}

// =============================================================================
// JSON Rendering
// =============================================================================

/// JSON representation of an error for machine consumption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorJson {
    pub error_code: String,
    pub kind: String,
    pub message: String,
    pub is_retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_path: Option<String>,
    pub suggestions: Vec<SuggestionJson>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionJson {
    pub commands: Vec<String>,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevention: Option<String>,
}

impl ErrorJson {
    #[must_use]
    pub fn from_error(error: &CcduError) -> Self {
        Self {
            error_code: error.error_code().to_string(),
            kind: error.kind().to_string(),
            message: error.to_string(),
            is_retryable: error.is_retryable(),
            tool_path: error.tool_path().map(String::from),
            suggestions: error
                .fix_suggestions()
                .into_iter()
                .map(|s| SuggestionJson {
                    commands: s.commands,
                    context: s.context,
                    prevention: s.prevention,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_render_includes_code_and_fix() {
        let err = CcduError::ToolNotFound("ccusage".to_string());
        let output = render_simple(&err);
        assert!(output.contains("CCDU-U002"));
        assert!(output.contains("ccusage"));
        assert!(output.contains("Fix: npm install -g ccusage"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn comment_commands_are_skipped() {
        let suggestions = vec![FixSuggestion::new(
            vec!["# note".to_string(), "ccdu check".to_string()],
            "ctx",
        )];
        assert_eq!(suggestion_commands(&suggestions), vec!["ccdu check"]);
    }

    #[test]
    fn json_render_is_structured() {
        let err = CcduError::Timeout {
            path: "/bin/ccusage".to_string(),
            seconds: 5,
        };
        let value: serde_json::Value = serde_json::from_str(&render_error_json(&err)).unwrap();
        assert_eq!(value["errorCode"], "CCDU-I002");
        assert_eq!(value["isRetryable"], true);
        assert_eq!(value["toolPath"], "/bin/ccusage");
        assert!(value["suggestions"][0]["context"].as_str().unwrap().contains("5s"));
    }

    #[test]
    fn human_without_color_is_simple() {
        let err = CcduError::Validation("bad".to_string());
        let output = render_error(&err, OutputFormat::Human, true);
        assert!(output.starts_with("Error [CCDU-V001]"));
    }
}
