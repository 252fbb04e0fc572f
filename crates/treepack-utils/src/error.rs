use std::fmt;
use std::io;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `TreepackError` is the error type returned by every treepack operation.
/// It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// # Error Categories
///
/// | Variant | Category | Fatal when |
/// |---------|----------|------------|
/// | `Config` | Configuration | before traversal starts (bad start dir, bad glob, bad config file) |
/// | `Io` | File System | any read or write of a selected file, bundle or split output |
/// | `NotFound` | Input | the bundle handed to `split` does not exist |
///
/// Non-fatal conditions (unreadable subdirectories, unmatched include
/// patterns, marker collisions) are never errors; they are logged as warnings.
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration errors |
/// | 66 | Split input not found |
/// | 74 | I/O errors |
///
/// Library code returns `TreepackError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum TreepackError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Input not found: {path}")]
    NotFound { path: String },
}

impl TreepackError {
    /// Wrap an I/O error with the path that caused it.
    pub fn io(path: impl fmt::Display, source: io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    FileSystem,
    Input,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::FileSystem => write!(f, "File System"),
            Self::Input => write!(f, "Input"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Start directory not found: {path}")]
    StartDirNotFound { path: String },

    #[error("Start directory is not a directory: {path}")]
    StartDirNotDirectory { path: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Failed to load configuration: {reason}")]
    Load { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::StartDirNotFound { path } => {
                format!("Start directory '{path}' does not exist")
            }
            Self::StartDirNotDirectory { path } => {
                format!("Start directory '{path}' is a file, not a directory")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::Load { reason } => {
                format!("Could not load configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::StartDirNotFound { .. } | Self::StartDirNotDirectory { .. } => Some(
                "The start directory is checked before any traversal begins; nothing was written."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' option has specific format requirements."
            )),
            Self::Load { .. } => Some(
                "Configuration files must be valid TOML with optional [defaults] and [selectors] sections."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::StartDirNotFound { .. } => vec![
                "Check the --start-dir flag or `defaults.start_dir` in .treepack/config.toml"
                    .to_string(),
                "Relative --start-dir values resolve against the current directory; relative values in the config file resolve against the project root that holds .treepack/"
                    .to_string(),
            ],
            Self::StartDirNotDirectory { .. } => {
                vec!["Point --start-dir at the directory that contains the file".to_string()]
            }
            Self::InvalidValue { key, .. } if key.starts_with("selectors.include") => vec![
                "Include patterns are globs: use '**' to cross directories, '*' within one segment"
                    .to_string(),
                "Quote patterns on the command line so the shell does not expand them"
                    .to_string(),
            ],
            Self::InvalidValue { .. } => {
                vec!["Run `treepack config` to see the effective values and their sources".to_string()]
            }
            Self::Load { .. } => vec![
                "Validate the TOML syntax of .treepack/config.toml".to_string(),
                "Use --config to point at a different file".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl UserFriendlyError for TreepackError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(config_err) => config_err.user_message(),
            Self::Io { path, source } if source.kind() == io::ErrorKind::InvalidData => {
                format!("'{path}' is not valid UTF-8 text")
            }
            Self::Io { path, source } => {
                format!("File system operation failed for '{path}': {source}")
            }
            Self::NotFound { path } => format!("Bundle file '{path}' not found"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(config_err) => config_err.context(),
            Self::Io { .. } => Some(
                "The run was aborted; any previous output file was left unchanged.".to_string(),
            ),
            Self::NotFound { .. } => {
                Some("`split` needs an existing bundle produced by `treepack bundle`.".to_string())
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(config_err) => config_err.suggestions(),
            Self::Io { source, .. } if source.kind() == io::ErrorKind::PermissionDenied => vec![
                "Check the file permissions".to_string(),
                "Exclude the file with --exclude-file or its directory with --exclude-dir"
                    .to_string(),
            ],
            Self::Io { source, .. } if source.kind() == io::ErrorKind::InvalidData => vec![
                "Binary files cannot be bundled; remove the extension from the allow-list"
                    .to_string(),
                "Exclude the file with --exclude-file".to_string(),
            ],
            Self::Io { .. } => vec!["Check available disk space and permissions".to_string()],
            Self::NotFound { .. } => vec![
                "Check the input path".to_string(),
                "Run `treepack bundle` first to produce a bundle".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Io { .. } => ErrorCategory::FileSystem,
            Self::NotFound { .. } => ErrorCategory::Input,
        }
    }
}

impl TreepackError {
    /// Get a user-friendly error message with context and actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    ///
    /// This is the single source of truth for CLI exit codes.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CONFIG,
            Self::Io { .. } => ExitCode::IO_FAILURE,
            Self::NotFound { .. } => ExitCode::NOT_FOUND,
        }
    }
}
