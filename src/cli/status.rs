//! `ccdu status`: fetch today's usage once and print it.

use crate::cli::args::OutputFormat;
use crate::core::service::UsageService;
use crate::error::{ErrorKind, Result};
use crate::render;
use crate::storage::config::Config;

/// Execute the status command.
///
/// The snapshot is always printed. A refresh failure other than "no data
/// today" is returned afterwards so the process exits non-zero.
pub async fn execute(config: &Config, format: OutputFormat, no_color: bool) -> Result<()> {
    let service = UsageService::new(config)?;
    let outcome = service.get_daily_usage().await;

    let output = render::render_status(
        &outcome.state,
        outcome.error.as_ref(),
        &config.display_format,
        format,
        no_color,
    )?;
    println!("{output}");

    match outcome.error {
        Some(err) if err.kind() != ErrorKind::NoDataToday => Err(err),
        _ => Ok(()),
    }
}
