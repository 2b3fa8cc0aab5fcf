//! ccdu - Claude Code daily usage monitor
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::{CommandFactory, Parser};
use std::process::ExitCode;

use ccdu::cli::{Cli, Commands, ConfigCommand};
use ccdu::core::logging;
use ccdu::storage::{ENV_NO_COLOR_STD, ResolvedConfig};
use ccdu::util::env::{Stream, color_enabled};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = cli.effective_format();
    let no_color = !color_enabled(
        cli.no_color || std::env::var_os(ENV_NO_COLOR_STD).is_some(),
        Stream::Stdout,
    );

    // Resolve config before logging so its log_level can apply; the error,
    // if any, is reported once logging is up.
    let resolved = match cli.command {
        Some(
            Commands::Completions { .. }
            | Commands::Config(ConfigCommand::Path | ConfigCommand::Init { .. }),
        ) => None,
        Some(Commands::Watch(ref args)) => Some(ResolvedConfig::resolve(&cli, args.interval)),
        _ => Some(ResolvedConfig::resolve(&cli, None)),
    };

    let config_level = resolved
        .as_ref()
        .and_then(|r| r.as_ref().ok())
        .and_then(|r| r.config.log_level());
    let log_settings = logging::LogSettings::resolve(
        cli.log_level.as_deref(),
        config_level,
        cli.json_output,
        cli.verbose,
    );
    logging::init(&log_settings);

    let result = match resolved {
        Some(Ok(resolved)) => {
            let no_color = no_color || resolved.no_color;
            run(cli, Some(&resolved), no_color).await
        }
        Some(Err(e)) => Err(e),
        None => run(cli, None, no_color).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{}", e);
            eprintln!("{}", ccdu::render::error::render_error(&e, format, no_color));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli, resolved: Option<&ResolvedConfig>, no_color: bool) -> ccdu::Result<()> {
    let format = cli.effective_format();

    match (&cli.command, resolved) {
        (Some(Commands::Completions { shell }), _) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "ccdu", &mut std::io::stdout());
            Ok(())
        }

        (Some(Commands::Config(sub @ (ConfigCommand::Path | ConfigCommand::Init { .. }))), _) => {
            let path = ResolvedConfig::locate(&cli);
            match sub {
                ConfigCommand::Init { force } => ccdu::cli::config::init(&path, *force),
                _ => {
                    println!("{}", path.display());
                    Ok(())
                }
            }
        }

        (Some(Commands::Config(sub)), Some(resolved)) => {
            ccdu::cli::config::execute(sub, resolved, format)
        }

        (Some(Commands::Check), Some(resolved)) => {
            ccdu::cli::check::execute(&resolved.config.tool_path, format, no_color)
        }

        (Some(Commands::Watch(args)), Some(resolved)) => {
            ccdu::cli::watch::run_watch(args, &resolved.config, format, no_color).await
        }

        // Default to the status command
        (None | Some(Commands::Status), Some(resolved)) => {
            ccdu::cli::status::execute(&resolved.config, format, no_color).await
        }

        (_, None) => Err(ccdu::CcduError::Config(
            "configuration was not resolved".to_string(),
        )),
    }
}
