//! CLI argument parsing and command dispatch.

pub mod args;
pub mod check;
pub mod config;
pub mod status;
pub mod watch;

pub use args::{Cli, Commands, ConfigCommand, OutputFormat, WatchArgs};
