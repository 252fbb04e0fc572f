use treepack_utils::error::{ConfigError, TreepackError};

use super::Config;

impl Config {
    /// Validate configuration values
    ///
    /// The start directory's existence is not checked here; that happens when
    /// a traversal begins, so `treepack config` works from anywhere.
    pub(crate) fn validate(&self) -> Result<(), TreepackError> {
        for (key, path) in [
            ("start_dir", &self.defaults.start_dir),
            ("output", &self.defaults.output),
            ("split_dir", &self.defaults.split_dir),
        ] {
            if path.as_str().trim().is_empty() {
                return Err(TreepackError::Config(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: "must not be empty".to_string(),
                }));
            }
        }

        if self.defaults.output.as_str().ends_with('/') {
            return Err(TreepackError::Config(ConfigError::InvalidValue {
                key: "output".to_string(),
                value: format!("'{}' names a directory, not a file", self.defaults.output),
            }));
        }

        self.selectors.validate()
    }
}
