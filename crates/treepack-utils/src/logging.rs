//! Logging and observability infrastructure for treepack
//!
//! Diagnostics are emitted through `tracing` and written to stderr so that
//! stdout stays reserved for tree listings and JSON summaries.
//!
//! Verbosity is resolved with precedence:
//! `--verbose` > `TREEPACK_LOG` > config file `log_level` > `info`.
//! `RUST_LOG`, when set, overrides the resolved level entirely.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;
use tracing::{Level, debug, span, warn};
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable controlling diagnostic volume.
pub const LOG_ENV_VAR: &str = "TREEPACK_LOG";

/// Diagnostic verbosity accepted by `TREEPACK_LOG` and `defaults.log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Self::Error),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "INFO" => Ok(Self::Info),
            "DEBUG" => Ok(Self::Debug),
            other => Err(format!(
                "unknown log level '{other}' (expected ERROR, WARN, INFO or DEBUG)"
            )),
        }
    }
}

/// Resolve the effective log level.
///
/// An unparseable environment value is ignored (and falls through to the
/// config value) rather than failing the run; the caller is told via the
/// returned flag so it can warn once logging is up.
#[must_use]
pub fn resolve_log_level(
    verbose: bool,
    env_value: Option<&str>,
    config_value: Option<LogLevel>,
) -> (LogLevel, bool) {
    if verbose {
        return (LogLevel::Debug, false);
    }

    let mut env_invalid = false;
    if let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) {
        match raw.parse::<LogLevel>() {
            Ok(level) => return (level, false),
            Err(_) => env_invalid = true,
        }
    }

    (config_value.unwrap_or_default(), env_invalid)
}

/// Colored diagnostics only on an interactive stderr, and never with `NO_COLOR` set.
fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when present; otherwise `level` is applied globally.
/// Output is compact, without targets, and goes to stderr.
pub fn init_tracing(level: LogLevel) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_directive()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(use_color())
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .without_time()
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Create a span covering one CLI command.
pub fn command_span(command: &str, root: &str) -> tracing::Span {
    span!(Level::INFO, "treepack", command = %command, root = %root)
}

/// Log an inclusion decision.
pub fn log_file_selected(path: &str) {
    debug!(path = %path, "selected");
}

/// Log an exclusion decision together with its reason.
pub fn log_file_skipped(path: &str, reason: &str) {
    debug!(path = %path, reason = %reason, "skipped");
}

/// Log a directory that traversal did not descend into.
pub fn log_dir_pruned(path: &str, reason: &str) {
    debug!(path = %path, reason = %reason, "pruned directory");
}

/// Warn about include patterns that matched no file.
pub fn log_unmatched_patterns(patterns: &[String]) {
    for pattern in patterns {
        warn!(pattern = %pattern, "include pattern matched no files");
    }
}
