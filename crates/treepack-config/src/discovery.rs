use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use treepack_utils::logging::LogLevel;

use super::{CONFIG_DIR, CONFIG_FILE_NAME, CliArgs, Config, ConfigSource};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    defaults: Option<FileDefaults>,
    selectors: Option<FileSelectors>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileDefaults {
    start_dir: Option<Utf8PathBuf>,
    output: Option<Utf8PathBuf>,
    split_dir: Option<Utf8PathBuf>,
    log_level: Option<LogLevel>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSelectors {
    extensions: Option<Vec<String>>,
    exclude_dirs: Option<Vec<String>>,
    exclude_files: Option<Vec<String>>,
    include: Option<Vec<String>>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let cwd = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|p| anyhow::anyhow!("Current directory is not UTF-8: {}", p.display()))?;
        Self::discover_from(&cwd, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    pub fn discover_from(start_dir: &Utf8Path, cli_args: &CliArgs) -> Result<Self> {
        let mut config = Self::builtin();

        let config_path = match &cli_args.config_path {
            Some(explicit) => Some(explicit.clone()),
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {path}"))?;
            config.apply_file(file_config, path);
            config.config_file = Some(path.clone());
        }

        config.apply_cli(cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Walk up from `start_dir` looking for `.treepack/config.toml`, stopping
    /// at repository root markers (.git, .hg, .svn) or the filesystem root.
    pub fn discover_config_file_from(start_dir: &Utf8Path) -> Result<Option<Utf8PathBuf>> {
        let mut current_dir = start_dir;

        loop {
            let config_path = current_dir.join(CONFIG_DIR).join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Ok(Some(config_path));
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent,
                None => break,
            }
        }

        Ok(None)
    }

    fn load_config_file(path: &Utf8Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {path}"))?;
        Ok(config)
    }

    fn apply_file(&mut self, file: TomlConfig, path: &Utf8Path) {
        let source = ConfigSource::ConfigFile(path.to_path_buf());
        let base = project_root_of(path);

        if let Some(defaults) = file.defaults {
            if let Some(start_dir) = defaults.start_dir {
                self.defaults.start_dir = resolve_against(&base, start_dir);
                self.attribute("start_dir", &source);
            }
            if let Some(output) = defaults.output {
                self.defaults.output = resolve_against(&base, output);
                self.attribute("output", &source);
            }
            if let Some(split_dir) = defaults.split_dir {
                self.defaults.split_dir = resolve_against(&base, split_dir);
                self.attribute("split_dir", &source);
            }
            if let Some(log_level) = defaults.log_level {
                self.defaults.log_level = log_level;
                self.attribute("log_level", &source);
            }
        }

        if let Some(selectors) = file.selectors {
            if let Some(extensions) = selectors.extensions {
                self.selectors.extensions = extensions;
                self.attribute("extensions", &source);
            }
            if let Some(exclude_dirs) = selectors.exclude_dirs {
                self.selectors.exclude_dirs = exclude_dirs;
                self.attribute("exclude_dirs", &source);
            }
            if let Some(exclude_files) = selectors.exclude_files {
                self.selectors.exclude_files = exclude_files;
                self.attribute("exclude_files", &source);
            }
            if let Some(include) = selectors.include {
                self.selectors.include = include;
                self.attribute("include", &source);
            }
        }
    }

    fn apply_cli(&mut self, cli: &CliArgs) {
        if let Some(start_dir) = &cli.start_dir {
            self.defaults.start_dir = start_dir.clone();
            self.attribute("start_dir", &ConfigSource::Cli);
        }
        if let Some(output) = &cli.output {
            self.defaults.output = output.clone();
            self.attribute("output", &ConfigSource::Cli);
        }
        if let Some(split_dir) = &cli.split_dir {
            self.defaults.split_dir = split_dir.clone();
            self.attribute("split_dir", &ConfigSource::Cli);
        }

        let lists = [
            ("extensions", &cli.extensions, &mut self.selectors.extensions),
            ("exclude_dirs", &cli.exclude_dirs, &mut self.selectors.exclude_dirs),
            ("exclude_files", &cli.exclude_files, &mut self.selectors.exclude_files),
            ("include", &cli.include, &mut self.selectors.include),
        ];
        let mut overridden = Vec::new();
        for (key, given, target) in lists {
            if !given.is_empty() {
                target.clone_from(given);
                overridden.push(key);
            }
        }
        for key in overridden {
            self.attribute(key, &ConfigSource::Cli);
        }
    }

    fn attribute(&mut self, key: &str, source: &ConfigSource) {
        self.source_attribution
            .insert(key.to_string(), source.clone());
    }
}

/// Directory that relative paths in a config file are resolved against: the
/// directory containing `.treepack/`, or the file's own directory when it
/// lives elsewhere.
fn project_root_of(config_path: &Utf8Path) -> Utf8PathBuf {
    let dir = config_path.parent().unwrap_or(Utf8Path::new(""));
    let root = if dir.file_name() == Some(CONFIG_DIR) {
        dir.parent().unwrap_or(Utf8Path::new(""))
    } else {
        dir
    };

    if root.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        root.to_path_buf()
    }
}

fn resolve_against(base: &Utf8Path, value: Utf8PathBuf) -> Utf8PathBuf {
    if value.is_absolute() {
        value
    } else {
        base.join(value)
    }
}
