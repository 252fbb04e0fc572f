//! CLI argument definitions
//!
//! Global options shape the selection and configuration; each subcommand
//! carries only its own output location.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// treepack - bundle a source tree into one text file, and split it back
#[derive(Parser, Debug)]
#[command(name = "treepack")]
#[command(about = "Bundle a source tree into one marker-delimited text file, and split it back")]
#[command(long_about = r#"
treepack walks a directory, selects files by extension and path rules, and
concatenates them into a single bundle where every file starts with a
`// File: <relative/path>` marker line. `split` reverses the process.

EXAMPLES:
  # Bundle the current directory with the built-in rules
  treepack bundle

  # Bundle only TypeScript sources under src/
  treepack --ext ts --include 'src/**' bundle -o context.txt

  # Preview the selection as a tree
  treepack --start-dir web tree

  # Restore a bundle into a directory
  treepack split context.txt -d restored

  # Show effective configuration and where each value came from
  treepack config

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .treepack/config.toml
  Use --config to specify an explicit config file path

ENVIRONMENT:
  TREEPACK_LOG   ERROR, WARN, INFO or DEBUG (RUST_LOG takes precedence)
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Directory to walk
    #[arg(long, global = true, value_name = "DIR")]
    pub start_dir: Option<Utf8PathBuf>,

    /// Allowed file extension (repeatable; replaces the configured list)
    #[arg(long = "ext", global = true, value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Directory exclusion pattern (repeatable; replaces the configured list)
    #[arg(long = "exclude-dir", global = true, value_name = "PAT")]
    pub exclude_dirs: Vec<String>,

    /// File name to skip (repeatable; replaces the configured list)
    #[arg(long = "exclude-file", global = true, value_name = "NAME")]
    pub exclude_files: Vec<String>,

    /// Include glob (repeatable; replaces the configured list)
    #[arg(long = "include", global = true, value_name = "GLOB")]
    pub include: Vec<String>,

    /// Enable debug diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print a machine-readable JSON summary on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk the start directory and write a bundle
    ///
    /// Examples:
    ///   treepack bundle
    ///   treepack bundle -o /tmp/context.txt
    Bundle {
        /// Bundle file to write (default: .treepack/bundle.txt)
        #[arg(short, long, value_name = "FILE")]
        output: Option<Utf8PathBuf>,
    },

    /// Print the selected files as an indented tree
    Tree {
        /// Write the listing to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<Utf8PathBuf>,
    },

    /// Split a bundle back into files
    ///
    /// Examples:
    ///   treepack split .treepack/bundle.txt
    ///   treepack split context.txt -d restored
    Split {
        /// Bundle to read
        input: Utf8PathBuf,

        /// Directory to restore into (default: .treepack/split)
        #[arg(short = 'd', long, value_name = "DIR")]
        out_dir: Option<Utf8PathBuf>,
    },

    /// Print the effective configuration with the source of each value
    Config,
}

impl Commands {
    /// Name used in logs and error reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bundle { .. } => "bundle",
            Self::Tree { .. } => "tree",
            Self::Split { .. } => "split",
            Self::Config => "config",
        }
    }
}

/// Build the clap command (for completions and tests).
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_repeatable_selector_flags() {
        let cli = Cli::try_parse_from([
            "treepack", "--ext", "ts", "--ext", ".md", "--include", "src/**", "bundle",
        ])
        .unwrap();
        assert_eq!(cli.extensions, vec!["ts", ".md"]);
        assert_eq!(cli.include, vec!["src/**"]);
        assert!(matches!(cli.command, Commands::Bundle { output: None }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["treepack", "tree", "--start-dir", "web", "-v"]).unwrap();
        assert_eq!(cli.start_dir.as_deref().map(|p| p.as_str()), Some("web"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_split_requires_input() {
        assert!(Cli::try_parse_from(["treepack", "split"]).is_err());
        let cli = Cli::try_parse_from(["treepack", "split", "b.txt", "-d", "out"]).unwrap();
        match cli.command {
            Commands::Split { input, out_dir } => {
                assert_eq!(input, "b.txt");
                assert_eq!(out_dir.unwrap(), "out");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
