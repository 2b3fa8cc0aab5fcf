//! `ccdu check`: report whether the usage tool is usable.

use crate::cli::args::OutputFormat;
use crate::core::cli_runner::check_tool;
use crate::error::{CcduError, Result};
use crate::render;

/// Execute the check command.
///
/// # Errors
///
/// Returns [`CcduError::ToolUnavailable`] after printing the report when the
/// tool is not an executable file.
pub fn execute(tool_path: &str, format: OutputFormat, no_color: bool) -> Result<()> {
    let check = check_tool(tool_path);
    tracing::debug!(?check, "tool check");
    println!("{}", render::render_check(&check, format, no_color)?);

    if check.available {
        Ok(())
    } else {
        Err(CcduError::ToolUnavailable {
            path: tool_path.to_string(),
        })
    }
}
