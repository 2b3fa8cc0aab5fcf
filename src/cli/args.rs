//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Claude Code daily usage monitor - polls ccusage and tracks daily cost.
#[derive(Parser, Debug)]
#[command(name = "ccdu")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Config file path (overrides CCDU_CONFIG)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Path or name of the ccusage binary
    #[arg(long, value_name = "PATH", global = true)]
    pub tool_path: Option<String>,

    /// Emit JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the effective output format.
    #[must_use]
    pub const fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's usage once (default command)
    Status,

    /// Poll continuously and print each update until Ctrl+C
    Watch(WatchArgs),

    /// Check that the usage tool can be found and executed
    Check,

    /// Inspect or create the config file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the `watch` command.
#[derive(Parser, Debug, Default)]
pub struct WatchArgs {
    /// Seconds between refreshes (10-300, default from config)
    #[arg(long, short = 'i', value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Skip the daily reset monitor
    #[arg(long)]
    pub no_reset: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Print the effective configuration and where each value came from
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
}
