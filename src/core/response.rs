//! `ccusage daily --json` response parsing.

use serde::{Deserialize, Serialize};

use crate::core::cli_runner::truncate_output;
use crate::error::{CcduError, Result};

/// One day of usage as reported by the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub total_cost: f64,
}

impl DailyUsage {
    /// Both tokens and cost are exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.total_tokens == 0 && self.total_cost == 0.0
    }
}

/// Aggregate totals across all reported days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTotals {
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub total_cost: f64,
}

/// Full daily report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CcusageResponse {
    #[serde(default)]
    pub daily: Vec<DailyUsage>,
    #[serde(default)]
    pub totals: Option<UsageTotals>,
}

/// Result of looking up a single date in a report.
#[derive(Debug, Clone, PartialEq)]
pub enum DayLookup {
    /// No record for the date.
    Missing,
    /// A record exists but reports zero tokens and zero cost.
    ZeroValues(DailyUsage),
    /// A record with real usage.
    Usage(DailyUsage),
}

impl CcusageResponse {
    /// Find the record for `date` (`YYYY-MM-DD`).
    #[must_use]
    pub fn find_day(&self, date: &str) -> DayLookup {
        match self.daily.iter().find(|d| d.date == date) {
            None => DayLookup::Missing,
            Some(day) if day.is_zero() => DayLookup::ZeroValues(day.clone()),
            Some(day) => DayLookup::Usage(day.clone()),
        }
    }

    /// Dates present in the report, in report order.
    #[must_use]
    pub fn available_dates(&self) -> Vec<&str> {
        self.daily.iter().map(|d| d.date.as_str()).collect()
    }
}

/// Decode raw tool output.
///
/// # Errors
///
/// Returns [`CcduError::ParseResponse`] if the bytes are not a valid report.
pub fn parse_response(output: &[u8]) -> Result<CcusageResponse> {
    serde_json::from_slice(output)
        .map_err(|e| CcduError::ParseResponse(format!("{e}: {}", truncate_output(output))))
}
