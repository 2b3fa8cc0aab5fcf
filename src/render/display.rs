//! One-line display text built from a usage snapshot.
//!
//! A display template is plain text with `{name}` placeholders:
//!
//! | Placeholder   | Value                              |
//! |---------------|------------------------------------|
//! | `{count}`     | tokens used today                  |
//! | `{cost}`      | cost today, `$x.xx`                |
//! | `{status}`    | alert label (`OK`, `High`, ...)    |
//! | `{indicator}` | status emoji                       |
//! | `{date}`      | render date, `YYYY-MM-DD`          |
//! | `{time}`      | render time, `HH:MM`               |

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use crate::core::models::UsageState;
use crate::util::format_cost;

/// Template used when none is configured.
pub const DEFAULT_DISPLAY_FORMAT: &str = "{status} {cost}";

/// Values available to display templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayData {
    pub count: u64,
    pub cost: String,
    pub status: String,
    pub indicator: String,
    pub date: String,
    pub time: String,
}

impl DisplayData {
    /// Build display values for `state` as of `now`.
    #[must_use]
    pub fn new(state: &UsageState, now: DateTime<Local>) -> Self {
        Self {
            count: state.daily_count,
            cost: format_cost(state.daily_cost),
            status: state.status.label().to_string(),
            indicator: state.indicator().emoji().to_string(),
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M").to_string(),
        }
    }

    fn field(&self, field: Field) -> String {
        match field {
            Field::Count => self.count.to_string(),
            Field::Cost => self.cost.clone(),
            Field::Status => self.status.clone(),
            Field::Indicator => self.indicator.clone(),
            Field::Date => self.date.clone(),
            Field::Time => self.time.clone(),
        }
    }
}

/// Template errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template cannot be empty")]
    Empty,
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),
    #[error("unclosed placeholder at byte {0}")]
    Unclosed(usize),
    #[error("template has no placeholders")]
    NoPlaceholders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Count,
    Cost,
    Status,
    Indicator,
    Date,
    Time,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "count" => Some(Self::Count),
            "cost" => Some(Self::Cost),
            "status" => Some(Self::Status),
            "indicator" => Some(Self::Indicator),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Field(Field),
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    if template.trim().is_empty() {
        return Err(TemplateError::Empty);
    }

    let mut segments = Vec::new();
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find('{') {
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or(TemplateError::Unclosed(offset + open))?;
        let name = &after[..close];
        let field = Field::parse(name.trim())
            .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
        segments.push(Segment::Field(field));

        let consumed = open + 1 + close + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }

    if !segments.iter().any(|s| matches!(s, Segment::Field(_))) {
        return Err(TemplateError::NoPlaceholders);
    }
    Ok(segments)
}

/// Check a template without rendering it.
///
/// # Errors
///
/// Returns a [`TemplateError`] for empty templates, unknown or unclosed
/// placeholders, or templates without any placeholder.
pub fn validate_template(template: &str) -> Result<(), TemplateError> {
    parse(template).map(|_| ())
}

/// Render `template` with `data`.
///
/// # Errors
///
/// Same as [`validate_template`].
pub fn format_display(template: &str, data: &DisplayData) -> Result<String, TemplateError> {
    let segments = parse(template)?;
    let mut out = String::with_capacity(template.len() + 16);
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Field(field) => out.push_str(&data.field(field)),
        }
    }
    Ok(out)
}

/// Render `template`, falling back to the default template on error.
#[must_use]
pub fn format_display_or_default(template: &str, data: &DisplayData) -> String {
    format_display(template, data).unwrap_or_else(|err| {
        tracing::warn!(template, error = %err, "invalid display format, using default");
        format_display(DEFAULT_DISPLAY_FORMAT, data).unwrap_or_default()
    })
}
