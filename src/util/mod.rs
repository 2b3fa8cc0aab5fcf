//! Utility functions.

pub mod env;
pub mod format;

pub use format::{format_cost, format_tokens};
