//! Shared usage state store.
//!
//! One reader/writer lock guards the snapshot, the thresholds used to derive
//! its status, the configured tool path, and the cache timestamp. Reads hand
//! out copies; every write replaces all fields of a terminal outcome in a
//! single critical section.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use parking_lot::RwLock;

use super::models::{AlertStatus, Thresholds, UsageState};

/// Final outcome of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminalState {
    /// Real usage for today.
    Applied { tokens: u64, cost: f64 },
    /// The tool works but reported nothing for today.
    NoDataToday,
    /// Tool unreachable or response untrustworthy.
    Unknown,
}

#[derive(Debug)]
struct Inner {
    state: UsageState,
    thresholds: Thresholds,
    tool_path: String,
    /// Time of the last terminal write; `None` forces the next read to refresh.
    last_query: Option<Instant>,
}

/// Lock-protected owner of the [`UsageState`].
#[derive(Debug)]
pub struct UsageStore {
    inner: RwLock<Inner>,
}

impl UsageStore {
    #[must_use]
    pub fn new(tool_path: impl Into<String>, thresholds: Thresholds, now: DateTime<Local>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                state: UsageState::new(now),
                thresholds,
                tool_path: tool_path.into(),
                last_query: None,
            }),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> UsageState {
        self.inner.read().state.clone()
    }

    /// Copy of the current state if it is available and younger than `window`.
    ///
    /// The validity check and the copy happen under the same read guard.
    #[must_use]
    pub fn cached_snapshot(&self, window: Duration) -> Option<UsageState> {
        let inner = self.inner.read();
        let fresh = inner
            .last_query
            .is_some_and(|at| at.elapsed() < window);
        (fresh && inner.state.is_available).then(|| inner.state.clone())
    }

    #[must_use]
    pub fn tool_path(&self) -> String {
        self.inner.read().tool_path.clone()
    }

    pub fn set_tool_path(&self, path: impl Into<String>) {
        self.inner.write().tool_path = path.into();
    }

    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.inner.read().thresholds
    }

    /// Replace the thresholds and recompute the status from the current cost.
    pub fn set_thresholds(&self, thresholds: Thresholds) -> UsageState {
        let mut inner = self.inner.write();
        inner.thresholds = thresholds;
        inner.state.update_status(thresholds);
        inner.state.clone()
    }

    /// Write the outcome of a refresh cycle and return the resulting copy.
    pub fn write_terminal(&self, terminal: TerminalState, now: DateTime<Local>) -> UsageState {
        let mut inner = self.inner.write();
        let thresholds = inner.thresholds;
        let state = &mut inner.state;

        match terminal {
            TerminalState::Applied { tokens, cost } => {
                state.daily_count = tokens;
                state.daily_cost = cost;
                state.is_available = true;
                state.status = AlertStatus::from_cost(cost, thresholds);
            }
            TerminalState::NoDataToday => {
                state.daily_count = 0;
                state.daily_cost = 0.0;
                state.is_available = true;
                state.status = AlertStatus::Green;
            }
            TerminalState::Unknown => {
                state.daily_count = 0;
                state.daily_cost = 0.0;
                state.is_available = false;
                state.status = AlertStatus::Unknown;
            }
        }
        state.last_update = now;

        let snapshot = state.clone();
        inner.last_query = Some(Instant::now());
        snapshot
    }

    /// Flag the tool as unreachable while a refresh is still retrying.
    ///
    /// Counters and `last_update` are left for the terminal write.
    pub fn mark_unavailable(&self) {
        let mut inner = self.inner.write();
        inner.state.is_available = false;
        inner.state.status = AlertStatus::Unknown;
    }

    /// Clear the daily counters and drop the cache timestamp.
    pub fn reset(&self, now: DateTime<Local>) -> UsageState {
        let mut inner = self.inner.write();
        inner.state.reset(now);
        inner.last_query = None;
        inner.state.clone()
    }
}
