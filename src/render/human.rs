//! Human-readable output.
//!
//! Renders the status line in the color of its alert level.

use chrono::Local;
use colored::{ColoredString, Colorize};

use super::display::{DisplayData, format_display_or_default};
use crate::core::cli_runner::ToolCheck;
use crate::core::models::{AlertStatus, UsageState};
use crate::error::{CcduError, ErrorKind};
use crate::util::format_tokens;

fn paint(text: &str, status: AlertStatus, no_color: bool) -> String {
    if no_color {
        return text.to_string();
    }
    let painted: ColoredString = match status {
        AlertStatus::Green => text.green(),
        AlertStatus::Yellow => text.yellow().bold(),
        AlertStatus::Red => text.red().bold(),
        AlertStatus::Unknown => text.dimmed(),
    };
    painted.to_string()
}

fn muted(text: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        text.dimmed().to_string()
    }
}

/// Render a snapshot as a display line plus a detail line.
#[must_use]
pub fn render_status(
    state: &UsageState,
    error: Option<&CcduError>,
    display_format: &str,
    no_color: bool,
) -> String {
    let data = DisplayData::new(state, Local::now());
    let line = format_display_or_default(display_format, &data);

    let mut lines = vec![paint(&line, state.status, no_color)];

    let detail = if state.is_available {
        format!(
            "{} tokens today, updated {}",
            format_tokens(state.daily_count),
            state.last_update.format("%H:%M:%S")
        )
    } else {
        "usage tool unavailable".to_string()
    };
    lines.push(muted(&detail, no_color));

    // Failures are reported on stderr by the caller; only the benign case is
    // folded into the status text.
    if let Some(err) = error.filter(|e| e.kind() == ErrorKind::NoDataToday) {
        lines.push(muted(&err.to_string(), no_color));
    }

    lines.join("\n")
}

/// Render a tool check as a short report.
#[must_use]
pub fn render_check(check: &ToolCheck, no_color: bool) -> String {
    let verdict = if check.available {
        paint("available", AlertStatus::Green, no_color)
    } else {
        paint("not available", AlertStatus::Red, no_color)
    };

    let resolved = check
        .resolved
        .as_ref()
        .map_or_else(|| "-".to_string(), |p| p.display().to_string());

    [
        format!("Usage tool: {verdict}"),
        format!("  configured: {}", check.configured),
        format!("  resolved:   {resolved}"),
    ]
    .join("\n")
}
