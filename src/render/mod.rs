//! Output rendering for human and robot modes.

pub mod display;
pub mod error;
pub mod human;
pub mod robot;

use crate::cli::args::OutputFormat;
use crate::core::cli_runner::ToolCheck;
use crate::core::models::UsageState;
use crate::error::{CcduError, Result};

pub use display::{
    DEFAULT_DISPLAY_FORMAT, DisplayData, TemplateError, format_display,
    format_display_or_default, validate_template,
};

/// Render a usage snapshot and the error that accompanied it, if any.
pub fn render_status(
    state: &UsageState,
    error: Option<&CcduError>,
    display_format: &str,
    format: OutputFormat,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_status(state, error, display_format, no_color)),
        OutputFormat::Json => robot::render_status_json(state, error, display_format),
    }
}

/// Render a tool availability check.
pub fn render_check(check: &ToolCheck, format: OutputFormat, no_color: bool) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_check(check, no_color)),
        OutputFormat::Json => robot::render_json(&robot::RobotOutput::new("check", check)),
    }
}
