//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Initializes logging
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;
use treepack_utils::logging::{LOG_ENV_VAR, command_span, init_tracing, resolve_log_level};

use super::args::{Cli, Commands};
use super::commands;
use crate::{CliArgs, Config, ConfigError, ExitCode, TreepackError};

/// Main CLI execution function.
///
/// Handles ALL output including errors and returns `Result<(), ExitCode>`;
/// main.rs only maps the error to `std::process::exit`.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    let cli_args = build_cli_args(&cli);

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = into_treepack_error(err);
            eprint!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    let env_level = std::env::var(LOG_ENV_VAR).ok();
    let (level, env_invalid) = resolve_log_level(
        cli.verbose,
        env_level.as_deref(),
        Some(config.defaults.log_level),
    );
    if let Err(e) = init_tracing(level) {
        eprintln!("warning: failed to initialize logging: {e}");
    }
    if env_invalid {
        tracing::warn!(
            var = LOG_ENV_VAR,
            value = env_level.as_deref().unwrap_or_default(),
            "ignoring unrecognized log level"
        );
    }

    let operation = cli.command.name();
    let span = command_span(operation, config.start_dir().as_str());
    let _guard = span.enter();

    let result = match &cli.command {
        Commands::Bundle { .. } => commands::execute_bundle_command(&config, cli.json),
        Commands::Tree { output } => {
            commands::execute_tree_command(&config, output.as_deref(), cli.json)
        }
        Commands::Split { input, .. } => {
            commands::execute_split_command(&config, input, cli.json)
        }
        Commands::Config => commands::execute_config_command(&config, cli.json),
    };

    if let Err(error) = result {
        return Err(report_error(error, operation));
    }

    Ok(())
}

fn build_cli_args(cli: &Cli) -> CliArgs {
    let (output, split_dir) = match &cli.command {
        Commands::Bundle { output } => (output.clone(), None),
        Commands::Split { out_dir, .. } => (None, out_dir.clone()),
        Commands::Tree { .. } | Commands::Config => (None, None),
    };

    CliArgs {
        config_path: cli.config.clone(),
        start_dir: cli.start_dir.clone(),
        output,
        split_dir,
        extensions: cli.extensions.clone(),
        exclude_dirs: cli.exclude_dirs.clone(),
        exclude_files: cli.exclude_files.clone(),
        include: cli.include.clone(),
    }
}

/// Config discovery reports through `anyhow`; typed errors pass through,
/// anything else (unreadable or malformed file) becomes a load error.
fn into_treepack_error(err: anyhow::Error) -> TreepackError {
    match err.downcast::<TreepackError>() {
        Ok(typed) => typed,
        Err(other) => TreepackError::Config(ConfigError::Load {
            reason: format!("{other:#}"),
        }),
    }
}

fn report_error(error: anyhow::Error, operation: &str) -> ExitCode {
    if let Some(typed) = error.downcast_ref::<TreepackError>() {
        eprint!("{}", typed.display_for_user());
        return typed.to_exit_code();
    }

    eprintln!("Error: unexpected failure during {operation}: {error:#}");
    eprintln!("\nSuggestions:");
    eprintln!("  • Run with --verbose for more detailed output");
    ExitCode::INTERNAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_take_output_from_bundle() {
        let cli = Cli::try_parse_from(["treepack", "bundle", "-o", "out.txt"]).unwrap();
        let args = build_cli_args(&cli);
        assert_eq!(args.output.as_deref().map(|p| p.as_str()), Some("out.txt"));
        assert!(args.split_dir.is_none());
    }

    #[test]
    fn test_cli_args_take_split_dir_from_split() {
        let cli = Cli::try_parse_from(["treepack", "--ext", "md", "split", "b.txt", "-d", "x"])
            .unwrap();
        let args = build_cli_args(&cli);
        assert_eq!(args.split_dir.as_deref().map(|p| p.as_str()), Some("x"));
        assert_eq!(args.extensions, vec!["md"]);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_untyped_discovery_error_becomes_load_error() {
        let err = into_treepack_error(anyhow::anyhow!("bad toml"));
        assert!(matches!(err, TreepackError::Config(ConfigError::Load { .. })));
        assert_eq!(err.to_exit_code(), ExitCode::CONFIG);
    }

    #[test]
    fn test_typed_discovery_error_is_preserved() {
        let typed = TreepackError::Config(ConfigError::InvalidValue {
            key: "selectors.include".to_string(),
            value: "bad".to_string(),
        });
        let err = into_treepack_error(anyhow::Error::new(typed));
        assert!(matches!(err, TreepackError::Config(ConfigError::InvalidValue { .. })));
    }
}
