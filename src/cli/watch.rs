//! `ccdu watch`: continuous polling with daily reset.
//!
//! Prints the current snapshot once, then every polling interval, until
//! Ctrl+C.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cli::args::{OutputFormat, WatchArgs};
use crate::core::models::UsageState;
use crate::core::service::{UsageCallback, UsageService};
use crate::error::{CcduError, Result};
use crate::render;
use crate::storage::config::Config;

/// Prints snapshots and counts frames.
#[derive(Debug)]
pub struct WatchPrinter {
    display_format: String,
    format: OutputFormat,
    no_color: bool,
    frames: AtomicU64,
}

impl WatchPrinter {
    #[must_use]
    pub fn new(display_format: impl Into<String>, format: OutputFormat, no_color: bool) -> Self {
        Self {
            display_format: display_format.into(),
            format,
            no_color,
            frames: AtomicU64::new(0),
        }
    }

    /// Render one frame. A failed render is logged and skipped.
    pub fn print(&self, state: &UsageState, error: Option<&CcduError>) {
        match render::render_status(
            state,
            error,
            &self.display_format,
            self.format,
            self.no_color,
        ) {
            Ok(frame) => {
                println!("{frame}");
                self.frames.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => tracing::error!(error = %err, "failed to render watch frame"),
        }
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

/// Run watch mode.
///
/// # Errors
///
/// Returns an error if the service cannot be built or the polling interval
/// is rejected.
pub async fn run_watch(
    args: &WatchArgs,
    config: &Config,
    format: OutputFormat,
    no_color: bool,
) -> Result<()> {
    let service = Arc::new(UsageService::new(config)?);
    let printer = Arc::new(WatchPrinter::new(
        config.display_format.clone(),
        format,
        no_color,
    ));

    // The first poll only fires after one interval, so show something now.
    let initial = service.get_daily_usage().await;
    if let Some(err) = &initial.error {
        tracing::warn!(error = %err, code = err.error_code(), "initial refresh failed");
    }
    printer.print(&initial.state, initial.error.as_ref());

    let interval_secs = i64::try_from(config.update_interval).map_err(|_| {
        CcduError::Validation(format!(
            "polling interval out of range: {}",
            config.update_interval
        ))
    })?;
    let sink = Arc::clone(&printer);
    let callback: UsageCallback = Arc::new(move |state: UsageState| sink.print(&state, None));
    service.start_polling(interval_secs, callback).await?;
    if !args.no_reset {
        service.start_daily_reset_monitor().await;
    }

    // Ctrl+C handler for clean shutdown.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(());
    });
    let _ = shutdown_rx.await;

    service.shutdown().await;
    tracing::info!(frames = printer.frames(), "watch stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn printer_counts_frames() {
        let printer = WatchPrinter::new("{status} {cost}", OutputFormat::Human, true);
        let state = UsageState::new(Local::now());
        printer.print(&state, None);
        printer.print(&state, None);
        assert_eq!(printer.frames(), 2);
    }
}
