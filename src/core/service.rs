//! Usage refresh engine.
//!
//! [`UsageService`] owns the [`UsageStore`] and drives the usage tool through
//! a bounded retry loop. Every refresh cycle ends with exactly one terminal
//! write, so readers never observe a half-applied result.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::cli_runner::{UsageTool, is_tool_available, truncate_output};
use super::clock::{Clock, SystemClock};
use super::models::{Thresholds, UsageState};
use super::response::{DayLookup, parse_response};
use super::scheduler::BackgroundTask;
use super::state::{TerminalState, UsageStore};
use crate::error::{CcduError, Result};
use crate::storage::config::Config;

/// Attempts per refresh on the polling path.
pub const POLLING_RETRY_COUNT: u32 = 3;

/// Attempts per on-demand refresh.
pub const ON_DEMAND_RETRY_COUNT: u32 = 1;

/// Linear backoff unit between attempts.
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_secs(1);

/// How often the reset monitor checks for a new calendar day.
pub const DEFAULT_RESET_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Receiver for snapshots produced by the background loops.
pub type UsageCallback = Arc<dyn Fn(UsageState) + Send + Sync>;

/// Snapshot plus the error that ended the refresh, if any.
///
/// The snapshot is always the consistent post-refresh state, even on error.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub state: UsageState,
    pub error: Option<CcduError>,
}

impl RefreshOutcome {
    #[must_use]
    pub const fn ok(state: UsageState) -> Self {
        Self { state, error: None }
    }

    #[must_use]
    pub const fn failed(state: UsageState, error: CcduError) -> Self {
        Self {
            state,
            error: Some(error),
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Collapse into a `Result`, dropping the snapshot on error.
    ///
    /// # Errors
    ///
    /// Returns the refresh error if there was one.
    pub fn into_result(self) -> Result<UsageState> {
        match self.error {
            None => Ok(self.state),
            Some(err) => Err(err),
        }
    }
}

/// Polls the usage tool and owns the shared usage snapshot.
pub struct UsageService {
    store: UsageStore,
    cache_window: Duration,
    cmd_timeout: Duration,
    backoff_step: Duration,
    reset_check_interval: Duration,
    clock: Arc<dyn Clock>,
    callback: Mutex<Option<UsageCallback>>,
    pub(super) poller: tokio::sync::Mutex<Option<BackgroundTask>>,
    pub(super) reset_monitor: tokio::sync::Mutex<Option<BackgroundTask>>,
}

impl std::fmt::Debug for UsageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageService")
            .field("store", &self.store)
            .field("cache_window", &self.cache_window)
            .field("cmd_timeout", &self.cmd_timeout)
            .field("backoff_step", &self.backoff_step)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl UsageService {
    /// Build a service from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configured thresholds are invalid.
    pub fn new(config: &Config) -> Result<Self> {
        let thresholds = Thresholds::new(config.yellow_threshold, config.red_threshold)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(Self {
            store: UsageStore::new(config.tool_path.clone(), thresholds, clock.now()),
            cache_window: Duration::from_secs(config.cache_window),
            cmd_timeout: Duration::from_secs(config.cmd_timeout),
            backoff_step: DEFAULT_BACKOFF_STEP,
            reset_check_interval: DEFAULT_RESET_CHECK_INTERVAL,
            clock,
            callback: Mutex::new(None),
            poller: tokio::sync::Mutex::new(None),
            reset_monitor: tokio::sync::Mutex::new(None),
        })
    }

    /// Replace the time source. The snapshot timestamps restart from it.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.store = UsageStore::new(self.store.tool_path(), self.store.thresholds(), clock.now());
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    #[must_use]
    pub const fn with_reset_check_interval(mut self, interval: Duration) -> Self {
        self.reset_check_interval = interval;
        self
    }

    #[must_use]
    pub const fn reset_check_interval(&self) -> Duration {
        self.reset_check_interval
    }

    pub(super) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Copy of the current snapshot, without refreshing.
    #[must_use]
    pub fn snapshot(&self) -> UsageState {
        self.store.snapshot()
    }

    /// Whether the configured tool currently resolves to an executable.
    #[must_use]
    pub fn is_available(&self) -> bool {
        is_tool_available(&self.store.tool_path())
    }

    #[must_use]
    pub fn tool_path(&self) -> String {
        self.store.tool_path()
    }

    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.store.thresholds()
    }

    /// Cached snapshot when fresh, otherwise a single-attempt refresh.
    pub async fn get_daily_usage(&self) -> RefreshOutcome {
        if let Some(state) = self.store.cached_snapshot(self.cache_window) {
            tracing::debug!(cost = state.daily_cost, "serving cached usage");
            return RefreshOutcome::ok(state);
        }
        self.update_usage().await
    }

    /// Bypass the cache and refresh once.
    pub async fn update_usage(&self) -> RefreshOutcome {
        self.refresh(ON_DEMAND_RETRY_COUNT).await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Clear the daily counters.
    ///
    /// # Errors
    ///
    /// Returns [`CcduError::ClockSkew`] if the clock reads earlier than the
    /// last reset; the snapshot is left untouched.
    pub fn reset_daily(&self) -> Result<()> {
        let now = self.clock.now();
        let last_reset = self.store.snapshot().last_reset;
        if now < last_reset {
            return Err(CcduError::ClockSkew {
                last_reset: last_reset.to_rfc3339(),
                now: now.to_rfc3339(),
            });
        }

        let state = self.store.reset(now);
        tracing::info!(
            status = %state.status,
            available = state.is_available,
            "daily usage reset"
        );
        Ok(())
    }

    /// Replace the cost thresholds and recompute the status.
    ///
    /// # Errors
    ///
    /// Returns a validation error and keeps the old thresholds if the new
    /// pair is invalid.
    pub fn set_thresholds(&self, yellow: f64, red: f64) -> Result<()> {
        let thresholds = Thresholds::new(yellow, red)?;
        let state = self.store.set_thresholds(thresholds);
        tracing::info!(yellow, red, status = %state.status, "thresholds updated");
        Ok(())
    }

    /// Point the service at another tool binary.
    ///
    /// # Errors
    ///
    /// Returns a validation error and keeps the old path if the new one is
    /// empty or not an executable file.
    pub fn set_tool_path(&self, path: &str) -> Result<()> {
        if path.trim().is_empty() {
            return Err(CcduError::Validation("tool path cannot be empty".to_string()));
        }
        if !is_tool_available(path) {
            return Err(CcduError::Validation(format!(
                "tool path is not an executable file: {path}"
            )));
        }

        self.store.set_tool_path(path);
        tracing::info!(path, "tool path updated");
        Ok(())
    }

    // =========================================================================
    // Refresh engine
    // =========================================================================

    /// Run one refresh cycle with up to `max_attempts` attempts.
    ///
    /// Only availability and invocation failures are retried. The returned
    /// snapshot is the state written by the single terminal write.
    pub async fn refresh(&self, max_attempts: u32) -> RefreshOutcome {
        let max_attempts = max_attempts.max(1);
        let tool = UsageTool::new(self.store.tool_path(), self.cmd_timeout);
        let mut last_err: Option<CcduError> = None;

        for attempt in 1..=max_attempts {
            if max_attempts > 1 {
                tracing::debug!(attempt, max_attempts, path = tool.path(), "refresh attempt");
            }

            if !tool.is_available() {
                tracing::warn!(attempt, path = tool.path(), "usage tool not available");
                last_err = Some(CcduError::ToolUnavailable {
                    path: tool.path().to_string(),
                });
                if attempt < max_attempts {
                    self.backoff(attempt).await;
                    continue;
                }
                break;
            }

            let output = match tool.fetch_daily().await {
                Ok(output) => output,
                Err(err) => {
                    self.store.mark_unavailable();
                    tracing::warn!(error = %err, attempt, path = tool.path(), "usage tool invocation failed");
                    if attempt < max_attempts {
                        self.backoff(attempt).await;
                        last_err = Some(err);
                        continue;
                    }
                    let state = self.write(TerminalState::Unknown);
                    return RefreshOutcome::failed(
                        state,
                        CcduError::Unavailable {
                            attempts: attempt,
                            source: Box::new(err),
                        },
                    );
                }
            };

            let response = match parse_response(&output) {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(
                        out_len = output.len(),
                        output = %truncate_output(&output),
                        "usage tool returned invalid JSON"
                    );
                    let state = self.write(TerminalState::Unknown);
                    return RefreshOutcome::failed(state, err);
                }
            };

            let today = self.clock.today();
            return match response.find_day(&today) {
                DayLookup::Missing => {
                    tracing::info!(
                        date = %today,
                        available = ?response.available_dates(),
                        "no usage recorded for today"
                    );
                    let state = self.write(TerminalState::NoDataToday);
                    RefreshOutcome::failed(state, CcduError::NoDataToday { date: today })
                }
                DayLookup::ZeroValues(_) => {
                    tracing::warn!(date = %today, "usage tool reported zero tokens and zero cost");
                    let state = self.write(TerminalState::Unknown);
                    RefreshOutcome::failed(state, CcduError::ZeroValues { date: today })
                }
                DayLookup::Usage(day) => {
                    let state = self.write(TerminalState::Applied {
                        tokens: day.total_tokens,
                        cost: day.total_cost,
                    });
                    tracing::info!(
                        tokens = day.total_tokens,
                        cost = day.total_cost,
                        date = %day.date,
                        status = %state.status,
                        attempt,
                        "usage updated"
                    );
                    RefreshOutcome::ok(state)
                }
            };
        }

        let state = self.write(TerminalState::Unknown);
        let err = last_err.unwrap_or_else(|| CcduError::ToolUnavailable {
            path: tool.path().to_string(),
        });
        RefreshOutcome::failed(state, err)
    }

    fn write(&self, terminal: TerminalState) -> UsageState {
        self.store.write_terminal(terminal, self.clock.now())
    }

    async fn backoff(&self, attempt: u32) {
        let delay = self.backoff_step * attempt;
        tracing::debug!(attempt, ?delay, "backing off before retry");
        tokio::time::sleep(delay).await;
    }

    // =========================================================================
    // Callback registration
    // =========================================================================

    pub(super) fn register_callback(&self, callback: UsageCallback) {
        *self.callback.lock() = Some(callback);
    }

    pub(super) fn clear_callback(&self) {
        *self.callback.lock() = None;
    }

    /// Hand a snapshot to the registered callback, if any.
    ///
    /// The registration lock is held for the call so a concurrent stop waits
    /// for an in-progress delivery.
    pub(super) fn deliver(&self, state: UsageState) -> bool {
        let guard = self.callback.lock();
        match guard.as_ref() {
            Some(callback) => {
                callback(state);
                true
            }
            None => false,
        }
    }
}
