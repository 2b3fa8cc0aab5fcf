//! Robot-mode output (JSON).
//!
//! Every payload is wrapped in a [`RobotOutput`] envelope with a stable
//! schema version.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use super::display::{DisplayData, format_display_or_default};
use super::error::ErrorJson;
use crate::core::models::{StatusIndicator, UsageState};
use crate::error::{CcduError, Result};

/// Schema version of the JSON envelope.
pub const SCHEMA_VERSION: &str = "ccdu.v1";

/// JSON envelope for command output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorJson>,
}

impl<T> RobotOutput<T> {
    /// Create a new robot output envelope.
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            command: command.into(),
            data,
            error: None,
        }
    }

    /// Attach an error report.
    #[must_use]
    pub fn with_error(mut self, error: Option<&CcduError>) -> Self {
        self.error = error.map(ErrorJson::from_error);
        self
    }
}

/// Usage snapshot as emitted in JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
    pub daily_count: u64,
    pub daily_cost: f64,
    pub status: String,
    pub indicator: StatusIndicator,
    pub is_available: bool,
    pub last_update: DateTime<Local>,
    pub last_reset: DateTime<Local>,
    pub display: String,
}

impl StatusData {
    #[must_use]
    pub fn new(state: &UsageState, display_format: &str) -> Self {
        let data = DisplayData::new(state, Local::now());
        Self {
            daily_count: state.daily_count,
            daily_cost: state.daily_cost,
            status: state.status.label().to_string(),
            indicator: state.indicator(),
            is_available: state.is_available,
            last_update: state.last_update,
            last_reset: state.last_reset,
            display: format_display_or_default(display_format, &data),
        }
    }
}

/// Render any serializable value as compact JSON.
pub fn render_json<T: Serialize>(output: &T) -> Result<String> {
    Ok(serde_json::to_string(output)?)
}

/// Render a snapshot envelope.
pub fn render_status_json(
    state: &UsageState,
    error: Option<&CcduError>,
    display_format: &str,
) -> Result<String> {
    let output =
        RobotOutput::new("status", StatusData::new(state, display_format)).with_error(error);
    render_json(&output)
}
