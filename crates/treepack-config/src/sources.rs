use std::collections::BTreeMap;

use super::Config;

/// Every key tracked in `source_attribution`.
pub(crate) const ALL_KEYS: &[&str] = &[
    "start_dir",
    "output",
    "split_dir",
    "log_level",
    "extensions",
    "exclude_dirs",
    "exclude_files",
    "include",
];

impl Config {
    /// Get effective configuration as key-value pairs with source attribution
    ///
    /// Values are rendered as strings; lists are comma-joined.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add = |key: &str, value: String| {
            let source = self.source_of(key).label().to_string();
            config.insert(key.to_string(), (value, source));
        };

        add("start_dir", self.defaults.start_dir.to_string());
        add("output", self.defaults.output.to_string());
        add("split_dir", self.defaults.split_dir.to_string());
        add("log_level", self.defaults.log_level.to_string());
        add("extensions", self.selectors.extensions.join(", "));
        add("exclude_dirs", self.selectors.exclude_dirs.join(", "));
        add("exclude_files", self.selectors.exclude_files.join(", "));
        add("include", self.selectors.include.join(", "));

        config
    }
}
