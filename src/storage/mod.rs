//! Storage for configuration and application paths.

pub mod config;
pub mod paths;

pub use config::{
    Config, ConfigSource, ConfigSources, ENV_CMD_TIMEOUT, ENV_CONFIG, ENV_NO_COLOR,
    ENV_NO_COLOR_STD, ENV_RED_THRESHOLD, ENV_TOOL_PATH, ENV_UPDATE_INTERVAL,
    ENV_YELLOW_THRESHOLD, ResolvedConfig,
};
pub use paths::AppPaths;
