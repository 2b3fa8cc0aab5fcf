//! Usage snapshot and alert status models.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{CcduError, Result};

// =============================================================================
// Alert Status
// =============================================================================

/// Alert level derived from the daily cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Cost below the yellow threshold.
    Green,
    /// Cost at or above yellow, below red.
    Yellow,
    /// Cost at or above red.
    Red,
    /// Usage data unavailable or untrustworthy.
    Unknown,
}

impl AlertStatus {
    /// Classify a cost against thresholds.
    ///
    /// Boundary values belong to the higher severity bucket.
    #[must_use]
    pub fn from_cost(cost: f64, thresholds: Thresholds) -> Self {
        if cost >= thresholds.red {
            Self::Red
        } else if cost >= thresholds.yellow {
            Self::Yellow
        } else {
            Self::Green
        }
    }

    /// Short user-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "OK",
            Self::Yellow => "High",
            Self::Red => "Critical",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Display indicator for a snapshot, as shown next to the cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusIndicator {
    Green,
    Yellow,
    Red,
    /// The usage tool is unreachable.
    Offline,
}

impl StatusIndicator {
    /// Pick the indicator for a status, falling back to offline when unavailable.
    #[must_use]
    pub const fn from_status(status: AlertStatus, is_available: bool) -> Self {
        if !is_available {
            return Self::Offline;
        }
        match status {
            AlertStatus::Green => Self::Green,
            AlertStatus::Yellow => Self::Yellow,
            AlertStatus::Red => Self::Red,
            AlertStatus::Unknown => Self::Offline,
        }
    }

    /// Emoji used in compact display lines.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Green => "🟢",
            Self::Yellow => "🟡",
            Self::Red => "🔴",
            Self::Offline => "⚪️",
        }
    }
}

// =============================================================================
// Thresholds
// =============================================================================

/// Cost thresholds in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub yellow: f64,
    pub red: f64,
}

impl Thresholds {
    /// Create validated thresholds.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either value is negative or not finite,
    /// or if `red` is not strictly greater than `yellow`.
    pub fn new(yellow: f64, red: f64) -> Result<Self> {
        if !yellow.is_finite() || yellow < 0.0 {
            return Err(CcduError::Validation(
                "yellow threshold must be a non-negative number".to_string(),
            ));
        }
        if !red.is_finite() || red < 0.0 {
            return Err(CcduError::Validation(
                "red threshold must be a non-negative number".to_string(),
            ));
        }
        if red <= yellow {
            return Err(CcduError::Validation(format!(
                "red threshold ({red:.2}) must be greater than yellow threshold ({yellow:.2})"
            )));
        }
        Ok(Self { yellow, red })
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            yellow: 10.0,
            red: 20.0,
        }
    }
}

// =============================================================================
// Usage State
// =============================================================================

/// Point-in-time copy of the shared daily usage state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageState {
    /// Tokens used today.
    pub daily_count: u64,
    /// Cost in USD for today.
    pub daily_cost: f64,
    pub status: AlertStatus,
    /// Whether the usage tool last responded validly.
    pub is_available: bool,
    pub last_update: DateTime<Local>,
    pub last_reset: DateTime<Local>,
}

impl UsageState {
    /// Initial state: no data, tool not yet reached.
    #[must_use]
    pub const fn new(now: DateTime<Local>) -> Self {
        Self {
            daily_count: 0,
            daily_cost: 0.0,
            status: AlertStatus::Unknown,
            is_available: false,
            last_update: now,
            last_reset: now,
        }
    }

    /// Indicator for display layers.
    #[must_use]
    pub const fn indicator(&self) -> StatusIndicator {
        StatusIndicator::from_status(self.status, self.is_available)
    }

    /// Recompute status from the current cost.
    ///
    /// An unavailable state stays `Unknown`.
    pub fn update_status(&mut self, thresholds: Thresholds) {
        self.status = if self.is_available {
            AlertStatus::from_cost(self.daily_cost, thresholds)
        } else {
            AlertStatus::Unknown
        };
    }

    /// Clear the daily counters, keeping availability and `last_update`.
    ///
    /// The status becomes `Green`, or stays `Unknown` while the tool is unavailable.
    pub fn reset(&mut self, now: DateTime<Local>) {
        self.daily_count = 0;
        self.daily_cost = 0.0;
        self.status = if self.is_available {
            AlertStatus::Green
        } else {
            AlertStatus::Unknown
        };
        self.last_reset = now;
    }

    /// Whether the status/availability invariant holds.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (self.status == AlertStatus::Unknown) != self.is_available
    }
}
