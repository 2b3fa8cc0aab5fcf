//! `ccdu config`: inspect or create the config file.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{ConfigCommand, OutputFormat};
use crate::error::{CcduError, Result};
use crate::render::robot::{RobotOutput, render_json};
use crate::storage::config::{Config, ConfigSource, ResolvedConfig};

/// One effective setting and its origin.
#[derive(Debug, Clone, Serialize)]
pub struct SettingRow {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

/// Execute a config subcommand.
pub fn execute(
    cmd: &ConfigCommand,
    resolved: &ResolvedConfig,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        ConfigCommand::Path => {
            println!("{}", resolved.config_path.display());
            Ok(())
        }
        ConfigCommand::Show => {
            let rows = setting_rows(resolved);
            let output = match format {
                OutputFormat::Json => render_json(&RobotOutput::new("config show", &rows))?,
                OutputFormat::Human => render_rows(&rows, &resolved.config_path),
            };
            println!("{output}");
            Ok(())
        }
        ConfigCommand::Init { force } => init(&resolved.config_path, *force),
    }
}

/// Write a default config file.
///
/// # Errors
///
/// Returns a config error if the file exists and `force` is not set.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CcduError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Config::default().save_to(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Effective settings in display order.
#[must_use]
pub fn setting_rows(resolved: &ResolvedConfig) -> Vec<SettingRow> {
    let config = &resolved.config;
    let sources = &resolved.sources;
    // Settings without an env or CLI override come from the file when it exists.
    let file_or_default = if resolved.config_path.exists() {
        ConfigSource::ConfigFile
    } else {
        ConfigSource::Default
    };

    let row = |key, value: String, source: ConfigSource| SettingRow {
        key,
        value,
        source: source.to_string(),
    };

    vec![
        row(
            "config_path",
            resolved.config_path.display().to_string(),
            sources.config_path,
        ),
        row("tool_path", config.tool_path.clone(), sources.tool_path),
        row(
            "update_interval",
            config.update_interval.to_string(),
            sources.update_interval,
        ),
        row(
            "yellow_threshold",
            config.yellow_threshold.to_string(),
            sources.yellow_threshold,
        ),
        row(
            "red_threshold",
            config.red_threshold.to_string(),
            sources.red_threshold,
        ),
        row("log_level", config.log_level.clone(), file_or_default),
        row(
            "cache_window",
            config.cache_window.to_string(),
            file_or_default,
        ),
        row(
            "cmd_timeout",
            config.cmd_timeout.to_string(),
            sources.cmd_timeout,
        ),
        row(
            "display_format",
            config.display_format.clone(),
            file_or_default,
        ),
        row("no_color", resolved.no_color.to_string(), sources.no_color),
    ]
}

fn render_rows(rows: &[SettingRow], path: &Path) -> String {
    let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    let mut lines = vec![format!("# {}", path.display())];
    lines.extend(
        rows.iter()
            .map(|r| format!("{:<width$}  {}  ({})", r.key, r.value, r.source)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::config::ConfigSources;

    fn resolved(path: &Path) -> ResolvedConfig {
        ResolvedConfig {
            config: Config::default(),
            config_path: path.to_path_buf(),
            no_color: false,
            sources: ConfigSources::default(),
        }
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        init(&path, false).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let err = init(&path, false).unwrap_err();
        assert!(matches!(err, CcduError::Config(_)));
        init(&path, true).unwrap();
    }

    #[test]
    fn rows_cover_every_setting() {
        let dir = tempfile::tempdir().unwrap();
        let rows = setting_rows(&resolved(&dir.path().join("config.toml")));
        let keys: Vec<_> = rows.iter().map(|r| r.key).collect();
        assert!(keys.contains(&"tool_path"));
        assert!(keys.contains(&"display_format"));
        assert!(rows.iter().all(|r| r.source == "default"));
    }

    #[test]
    fn rendered_rows_are_aligned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let out = render_rows(&setting_rows(&resolved(&path)), &path);
        assert!(out.lines().any(|l| l.starts_with("tool_path         ccusage")));
    }
}
