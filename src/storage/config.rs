//! Configuration file loading and management.
//!
//! Loads configuration from:
//! - Linux: `~/.config/ccdu/config.toml`
//! - macOS: `~/Library/Application Support/ccdu/config.toml`
//! - Windows: `%APPDATA%/ccdu/config/config.toml`
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `CCDU_CONFIG`: Override config file path
//! - `CCDU_TOOL_PATH`: Path or name of the `ccusage` binary
//! - `CCDU_UPDATE_INTERVAL`: Polling interval in seconds
//! - `CCDU_YELLOW_THRESHOLD` / `CCDU_RED_THRESHOLD`: Cost thresholds in USD
//! - `CCDU_CMD_TIMEOUT`: Per-invocation timeout in seconds
//! - `CCDU_NO_COLOR` or `NO_COLOR`: Disable colors (1, true, yes)

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::cli::args::Cli;
use crate::core::logging::LogLevel;
use crate::error::{CcduError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable to override config file path.
pub const ENV_CONFIG: &str = "CCDU_CONFIG";
/// Environment variable for the usage tool path.
pub const ENV_TOOL_PATH: &str = "CCDU_TOOL_PATH";
/// Environment variable for the polling interval in seconds.
pub const ENV_UPDATE_INTERVAL: &str = "CCDU_UPDATE_INTERVAL";
/// Environment variable for the yellow cost threshold.
pub const ENV_YELLOW_THRESHOLD: &str = "CCDU_YELLOW_THRESHOLD";
/// Environment variable for the red cost threshold.
pub const ENV_RED_THRESHOLD: &str = "CCDU_RED_THRESHOLD";
/// Environment variable for the command timeout in seconds.
pub const ENV_CMD_TIMEOUT: &str = "CCDU_CMD_TIMEOUT";
/// Environment variable to disable colors.
pub const ENV_NO_COLOR: &str = "CCDU_NO_COLOR";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";

// =============================================================================
// Limits
// =============================================================================

pub const MIN_UPDATE_INTERVAL: u64 = 10;
pub const MAX_UPDATE_INTERVAL: u64 = 300;
pub const MIN_CACHE_WINDOW: u64 = 1;
pub const MAX_CACHE_WINDOW: u64 = 300;
pub const MIN_CMD_TIMEOUT: u64 = 1;
pub const MAX_CMD_TIMEOUT: u64 = 60;

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved configuration after merging CLI, env vars, and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Effective settings, validated.
    pub config: Config,
    /// Config file that was consulted (it may not exist).
    pub config_path: PathBuf,
    /// Whether to disable colored output.
    pub no_color: bool,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub config_path: ConfigSource,
    pub tool_path: ConfigSource,
    pub update_interval: ConfigSource,
    pub yellow_threshold: ConfigSource,
    pub red_threshold: ConfigSource,
    pub cmd_timeout: ConfigSource,
    pub no_color: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, environment variables, and config file.
    ///
    /// `interval` is the `watch --interval` flag when present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file exists but is invalid
    /// - Any resolved value is out of range
    pub fn resolve(cli: &Cli, interval: Option<u64>) -> Result<Self> {
        let mut sources = ConfigSources::default();

        let config_path = Self::resolve_config_path(cli, &mut sources.config_path);
        let file_exists = config_path.exists();
        let file = Config::load_from(&config_path)?;
        let file_source = if file_exists {
            ConfigSource::ConfigFile
        } else {
            ConfigSource::Default
        };

        let mut config = file.clone();

        config.tool_path = Self::pick(
            cli.tool_path.clone(),
            ENV_TOOL_PATH,
            file.tool_path,
            file_source,
            &mut sources.tool_path,
        );
        config.update_interval = Self::pick(
            interval,
            ENV_UPDATE_INTERVAL,
            file.update_interval,
            file_source,
            &mut sources.update_interval,
        );
        config.yellow_threshold = Self::pick(
            None,
            ENV_YELLOW_THRESHOLD,
            file.yellow_threshold,
            file_source,
            &mut sources.yellow_threshold,
        );
        config.red_threshold = Self::pick(
            None,
            ENV_RED_THRESHOLD,
            file.red_threshold,
            file_source,
            &mut sources.red_threshold,
        );
        config.cmd_timeout = Self::pick(
            None,
            ENV_CMD_TIMEOUT,
            file.cmd_timeout,
            file_source,
            &mut sources.cmd_timeout,
        );

        config.validate()?;

        let no_color = Self::resolve_no_color(cli, &mut sources.no_color);

        Ok(Self {
            config,
            config_path,
            no_color,
            sources,
        })
    }

    /// Config file path for `cli`, without reading the file.
    #[must_use]
    pub fn locate(cli: &Cli) -> PathBuf {
        let mut source = ConfigSource::Default;
        Self::resolve_config_path(cli, &mut source)
    }

    /// Resolve the config file path (`--config` > `CCDU_CONFIG` > default).
    fn resolve_config_path(cli: &Cli, source: &mut ConfigSource) -> PathBuf {
        if let Some(path) = &cli.config {
            *source = ConfigSource::Cli;
            return path.clone();
        }

        if let Ok(path) = std::env::var(ENV_CONFIG) {
            if !path.trim().is_empty() {
                *source = ConfigSource::Env;
                return PathBuf::from(path);
            }
        }

        *source = ConfigSource::Default;
        Config::config_path()
    }

    /// Pick a value by precedence. Unparsable env values are ignored.
    fn pick<T: FromStr>(
        cli: Option<T>,
        env_var: &str,
        file: T,
        file_source: ConfigSource,
        source: &mut ConfigSource,
    ) -> T {
        // 1. CLI flag
        if let Some(value) = cli {
            *source = ConfigSource::Cli;
            return value;
        }

        // 2. Environment variable
        if let Ok(raw) = std::env::var(env_var) {
            match raw.trim().parse::<T>() {
                Ok(value) => {
                    *source = ConfigSource::Env;
                    return value;
                }
                Err(_) => {
                    tracing::warn!(var = env_var, value = %raw, "ignoring unparsable environment override");
                }
            }
        }

        // 3. Config file, or the default when there is no file
        *source = file_source;
        file
    }

    /// Resolve no_color setting.
    fn resolve_no_color(cli: &Cli, source: &mut ConfigSource) -> bool {
        // 1. CLI --no-color flag
        if cli.no_color {
            *source = ConfigSource::Cli;
            return true;
        }

        // 2. Environment variable (CCDU_NO_COLOR or standard NO_COLOR)
        if is_env_truthy(ENV_NO_COLOR) || std::env::var(ENV_NO_COLOR_STD).is_ok() {
            *source = ConfigSource::Env;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }
}

/// Check if an environment variable is set to a truthy value.
#[must_use]
pub fn is_env_truthy(var: &str) -> bool {
    std::env::var(var)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

// =============================================================================
// Config File
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path or bare name of the `ccusage` binary.
    pub tool_path: String,
    /// Polling interval in seconds.
    pub update_interval: u64,
    /// Daily cost in USD at which the status turns yellow.
    pub yellow_threshold: f64,
    /// Daily cost in USD at which the status turns red.
    pub red_threshold: f64,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// How long a successful refresh is served from cache, in seconds.
    pub cache_window: u64,
    /// Per-invocation timeout for the usage tool, in seconds.
    pub cmd_timeout: u64,
    /// Template for the one-line display.
    pub display_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool_path: "ccusage".to_string(),
            update_interval: 30,
            yellow_threshold: 10.0,
            red_threshold: 20.0,
            log_level: "info".to_string(),
            cache_window: 10,
            cmd_timeout: 5,
            display_format: crate::render::DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file path.
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns error only if the file exists but is invalid.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns error only if the file exists but is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| CcduError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save configuration to the default config file path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CcduError::Config(format!("Failed to serialize config: {e}")))?;

        fs::write(path, content)?;
        tracing::debug!(?path, "Config file saved");
        Ok(())
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_path() -> PathBuf {
        AppPaths::new().config_file()
    }

    /// Parsed log level.
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        LogLevel::from_name(&self.log_level)
    }

    /// Validate configuration values.
    ///
    /// Checks that:
    /// - The tool path is not empty
    /// - Interval, cache window, and timeout are within their ranges
    /// - Thresholds are non-negative and red is above yellow
    /// - The log level is known
    /// - The display format uses only known placeholders
    pub fn validate(&self) -> Result<()> {
        if self.tool_path.trim().is_empty() {
            return Err(CcduError::Config("tool_path cannot be empty".to_string()));
        }

        check_range(
            "update_interval",
            self.update_interval,
            MIN_UPDATE_INTERVAL,
            MAX_UPDATE_INTERVAL,
        )?;
        check_range(
            "cache_window",
            self.cache_window,
            MIN_CACHE_WINDOW,
            MAX_CACHE_WINDOW,
        )?;
        check_range(
            "cmd_timeout",
            self.cmd_timeout,
            MIN_CMD_TIMEOUT,
            MAX_CMD_TIMEOUT,
        )?;

        if !self.yellow_threshold.is_finite() || self.yellow_threshold < 0.0 {
            return Err(CcduError::Config(
                "yellow_threshold must be a non-negative number".to_string(),
            ));
        }
        if !self.red_threshold.is_finite() || self.red_threshold < 0.0 {
            return Err(CcduError::Config(
                "red_threshold must be a non-negative number".to_string(),
            ));
        }
        if self.red_threshold <= self.yellow_threshold {
            return Err(CcduError::Config(format!(
                "red_threshold ({}) must be greater than yellow_threshold ({})",
                self.red_threshold, self.yellow_threshold
            )));
        }

        if self.log_level().is_none() {
            return Err(CcduError::Config(format!(
                "Invalid log_level \"{}\". Valid levels: {}",
                self.log_level,
                LogLevel::NAMES.join(", ")
            )));
        }

        crate::render::validate_template(&self.display_format)
            .map_err(|e| CcduError::Config(format!("display_format: {e}")))?;

        Ok(())
    }
}

fn check_range(name: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CcduError::Config(format!(
            "{name} must be between {min} and {max} seconds, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    const ALL_ENV: [&str; 8] = [
        ENV_CONFIG,
        ENV_TOOL_PATH,
        ENV_UPDATE_INTERVAL,
        ENV_YELLOW_THRESHOLD,
        ENV_RED_THRESHOLD,
        ENV_CMD_TIMEOUT,
        ENV_NO_COLOR,
        ENV_NO_COLOR_STD,
    ];

    /// Clears every ccdu variable on creation and drop.
    struct EnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
    }

    impl EnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            for key in ALL_ENV {
                remove_env(key);
            }
            Self { _lock: lock }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in ALL_ENV {
                remove_env(key);
            }
        }
    }

    #[allow(unsafe_code)]
    fn set_env(key: &str, value: &str) {
        // SAFETY: serialized through ENV_LOCK
        unsafe { std::env::set_var(key, value) };
    }

    #[allow(unsafe_code)]
    fn remove_env(key: &str) {
        // SAFETY: serialized through ENV_LOCK
        unsafe { std::env::remove_var(key) };
    }

    /// CLI pointing at a config file that does not exist.
    fn make_test_cli(dir: &Path) -> Cli {
        Cli {
            command: None,
            config: Some(dir.join("missing.toml")),
            tool_path: None,
            json: false,
            no_color: false,
            log_level: None,
            json_output: false,
            verbose: false,
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.tool_path, "ccusage");
        assert_eq!(config.update_interval, 30);
        assert_eq!(config.cache_window, 10);
        assert_eq!(config.cmd_timeout, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_missing_file_returns_default() {
        let config = Config::load_from(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_valid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
tool_path = "/opt/ccusage/bin/ccusage"
update_interval = 60
yellow_threshold = 5.0
red_threshold = 15.5
display_format = "{{indicator}} {{cost}}"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.tool_path, "/opt/ccusage/bin/ccusage");
        assert_eq!(config.update_interval, 60);
        assert!((config.red_threshold - 15.5).abs() < f64::EPSILON);
        assert_eq!(config.display_format, "{indicator} {cost}");
        // Unset fields keep their defaults.
        assert_eq!(config.cmd_timeout, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_invalid_toml_returns_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, CcduError::ConfigParse { .. }));
    }

    #[test]
    fn roundtrip_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            update_interval: 120,
            tool_path: "/usr/local/bin/ccusage".to_string(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn validate_ranges() {
        let cases = [
            Config {
                update_interval: 9,
                ..Config::default()
            },
            Config {
                update_interval: 301,
                ..Config::default()
            },
            Config {
                cache_window: 0,
                ..Config::default()
            },
            Config {
                cmd_timeout: 61,
                ..Config::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?}");
        }

        let boundary = Config {
            update_interval: 10,
            cache_window: 300,
            cmd_timeout: 60,
            ..Config::default()
        };
        assert!(boundary.validate().is_ok());
    }

    #[test]
    fn validate_thresholds() {
        let inverted = Config {
            yellow_threshold: 20.0,
            red_threshold: 10.0,
            ..Config::default()
        };
        assert!(inverted.validate().is_err());

        let negative = Config {
            yellow_threshold: -1.0,
            ..Config::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn validate_log_level_and_format() {
        let bad_level = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(bad_level.validate().is_err());

        let bad_format = Config {
            display_format: "{status} {price}".to_string(),
            ..Config::default()
        };
        let err = bad_format.validate().unwrap_err();
        assert!(err.to_string().contains("price"));

        let empty_tool = Config {
            tool_path: "  ".to_string(),
            ..Config::default()
        };
        assert!(empty_tool.validate().is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "future_option = true\nupdate_interval = 45").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.update_interval, 45);
    }

    // -------------------------------------------------------------------------
    // ResolvedConfig tests
    // -------------------------------------------------------------------------

    #[test]
    fn config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI flag");
        assert_eq!(ConfigSource::Env.to_string(), "environment variable");
        assert_eq!(ConfigSource::ConfigFile.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }

    #[test]
    fn resolved_config_default_values() {
        let _env = EnvGuard::new();
        let dir = tempfile::tempdir().unwrap();
        let resolved = ResolvedConfig::resolve(&make_test_cli(dir.path()), None).unwrap();

        assert_eq!(resolved.config, Config::default());
        assert_eq!(resolved.sources.config_path, ConfigSource::Cli);
        assert_eq!(resolved.sources.tool_path, ConfigSource::Default);
        assert_eq!(resolved.sources.update_interval, ConfigSource::Default);
        assert!(!resolved.no_color);
    }

    #[test]
    fn env_overrides_config_file() {
        let _env = EnvGuard::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tool_path = \"/from/file\"\nupdate_interval = 60\n").unwrap();

        set_env(ENV_CONFIG, path.to_str().unwrap());
        set_env(ENV_UPDATE_INTERVAL, "90");
        set_env(ENV_RED_THRESHOLD, "25.5");

        let mut cli = make_test_cli(dir.path());
        cli.config = None;
        let resolved = ResolvedConfig::resolve(&cli, None).unwrap();

        assert_eq!(resolved.config_path, path);
        assert_eq!(resolved.sources.config_path, ConfigSource::Env);
        assert_eq!(resolved.config.tool_path, "/from/file");
        assert_eq!(resolved.sources.tool_path, ConfigSource::ConfigFile);
        assert_eq!(resolved.config.update_interval, 90);
        assert_eq!(resolved.sources.update_interval, ConfigSource::Env);
        assert!((resolved.config.red_threshold - 25.5).abs() < f64::EPSILON);
        assert_eq!(resolved.sources.red_threshold, ConfigSource::Env);
    }

    #[test]
    fn cli_overrides_env() {
        let _env = EnvGuard::new();
        let dir = tempfile::tempdir().unwrap();
        set_env(ENV_TOOL_PATH, "/from/env");
        set_env(ENV_UPDATE_INTERVAL, "90");

        let mut cli = make_test_cli(dir.path());
        cli.tool_path = Some("/from/cli".to_string());
        cli.no_color = true;
        let resolved = ResolvedConfig::resolve(&cli, Some(15)).unwrap();

        assert_eq!(resolved.config.tool_path, "/from/cli");
        assert_eq!(resolved.sources.tool_path, ConfigSource::Cli);
        assert_eq!(resolved.config.update_interval, 15);
        assert_eq!(resolved.sources.update_interval, ConfigSource::Cli);
        assert!(resolved.no_color);
        assert_eq!(resolved.sources.no_color, ConfigSource::Cli);
    }

    #[test]
    fn unparsable_env_is_ignored() {
        let _env = EnvGuard::new();
        let dir = tempfile::tempdir().unwrap();
        set_env(ENV_CMD_TIMEOUT, "soon");

        let resolved = ResolvedConfig::resolve(&make_test_cli(dir.path()), None).unwrap();
        assert_eq!(resolved.config.cmd_timeout, 5);
        assert_eq!(resolved.sources.cmd_timeout, ConfigSource::Default);
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let _env = EnvGuard::new();
        let dir = tempfile::tempdir().unwrap();
        let err = ResolvedConfig::resolve(&make_test_cli(dir.path()), Some(5)).unwrap_err();
        assert!(err.to_string().contains("update_interval"));
    }

    #[test]
    fn no_color_std_env() {
        let _env = EnvGuard::new();
        let dir = tempfile::tempdir().unwrap();
        set_env(ENV_NO_COLOR_STD, "");

        let resolved = ResolvedConfig::resolve(&make_test_cli(dir.path()), None).unwrap();
        assert!(resolved.no_color);
        assert_eq!(resolved.sources.no_color, ConfigSource::Env);
    }

    #[test]
    fn is_env_truthy_values() {
        let _env = EnvGuard::new();
        for value in ["1", "true", "YES", "on"] {
            set_env(ENV_NO_COLOR, value);
            assert!(is_env_truthy(ENV_NO_COLOR), "{value}");
        }
        for value in ["0", "false", "no", ""] {
            set_env(ENV_NO_COLOR, value);
            assert!(!is_env_truthy(ENV_NO_COLOR), "{value}");
        }
    }
}
