//! Usage polling engine: tool invocation, parsing, shared state, and schedulers.

pub mod cli_runner;
pub mod clock;
pub mod logging;
pub mod models;
pub mod response;
pub mod scheduler;
pub mod service;
pub mod state;

pub use cli_runner::{ToolCheck, UsageTool, check_tool, is_tool_available, resolve_tool};
pub use clock::{Clock, ManualClock, SystemClock};
pub use models::{AlertStatus, StatusIndicator, Thresholds, UsageState};
pub use response::{CcusageResponse, DailyUsage, DayLookup, UsageTotals, parse_response};
pub use scheduler::BackgroundTask;
pub use service::{
    POLLING_RETRY_COUNT, RefreshOutcome, UsageCallback, UsageService,
};
pub use state::{TerminalState, UsageStore};
