use camino::Utf8PathBuf;

/// Values supplied on the command line.
///
/// `None` and empty lists mean "not given", so the config file or the
/// built-in default applies. A non-empty list replaces the lower layer's
/// list as a whole.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file; skips discovery
    pub config_path: Option<Utf8PathBuf>,
    pub start_dir: Option<Utf8PathBuf>,
    /// Bundle output file
    pub output: Option<Utf8PathBuf>,
    /// Split output root
    pub split_dir: Option<Utf8PathBuf>,
    pub extensions: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<String>,
    pub include: Vec<String>,
}
