use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use treepack_selectors::RuleSet;
use treepack_utils::logging::LogLevel;

/// Directory holding the config file and the default outputs.
pub const CONFIG_DIR: &str = ".treepack";
/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_START_DIR: &str = ".";
pub const DEFAULT_OUTPUT: &str = ".treepack/bundle.txt";
pub const DEFAULT_SPLIT_DIR: &str = ".treepack/split";

/// Where an effective configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    ConfigFile(Utf8PathBuf),
    Default,
}

impl ConfigSource {
    /// Stable label used in `treepack config` output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::ConfigFile(_) => "config",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Effective configuration for one run. Built once, then passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub defaults: Defaults,
    pub selectors: RuleSet,
    /// Source of each key, keyed like [`Config::effective_config`].
    pub source_attribution: HashMap<String, ConfigSource>,
    /// The config file that was loaded, if any.
    pub config_file: Option<Utf8PathBuf>,
}

/// `[defaults]` values after all layers are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    pub start_dir: Utf8PathBuf,
    pub output: Utf8PathBuf,
    pub split_dir: Utf8PathBuf,
    pub log_level: LogLevel,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            start_dir: Utf8PathBuf::from(DEFAULT_START_DIR),
            output: Utf8PathBuf::from(DEFAULT_OUTPUT),
            split_dir: Utf8PathBuf::from(DEFAULT_SPLIT_DIR),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Built-in defaults with every key attributed to [`ConfigSource::Default`].
    #[must_use]
    pub fn builtin() -> Self {
        let source_attribution = crate::sources::ALL_KEYS
            .iter()
            .map(|key| ((*key).to_string(), ConfigSource::Default))
            .collect();

        Self {
            defaults: Defaults::default(),
            selectors: RuleSet::default(),
            source_attribution,
            config_file: None,
        }
    }

    #[must_use]
    pub fn start_dir(&self) -> &Utf8Path {
        &self.defaults.start_dir
    }

    #[must_use]
    pub fn output(&self) -> &Utf8Path {
        &self.defaults.output
    }

    #[must_use]
    pub fn split_dir(&self) -> &Utf8Path {
        &self.defaults.split_dir
    }

    /// Source of `key`, falling back to [`ConfigSource::Default`].
    #[must_use]
    pub fn source_of(&self, key: &str) -> &ConfigSource {
        static DEFAULT: ConfigSource = ConfigSource::Default;
        self.source_attribution.get(key).unwrap_or(&DEFAULT)
    }
}
