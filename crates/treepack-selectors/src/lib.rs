//! Selection rules deciding which files of a source tree end up in a bundle.
//!
//! A [`RuleSet`] is plain configuration (deserialized from the `[selectors]`
//! table of `.treepack/config.toml` or assembled from CLI flags). It is
//! compiled once into a [`RuleMatcher`], which answers the per-path
//! questions asked during traversal.

use globset::GlobBuilder;
use treepack_utils::error::{ConfigError, TreepackError};

mod matcher;
mod prune;

pub use matcher::{Decision, RuleMatcher};

/// File extensions collected by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "cs", "ts", "html", "json", "yaml", "yml", "css", "md", "old", "svelte", "js", "txt", "scss",
    "cjs", "mjs",
];

/// Directory names never descended into by default.
///
/// `.treepack` holds treepack's own config and default outputs.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "bin",
    "obj",
    ".git",
    "Tests",
    ".venv",
    "output",
    ".svelte-kit",
    "generated_data",
    "generate_files",
    "input_data",
    "node_modules",
    ".vite",
    "playwright-report",
    ".treepack",
];

/// File names never collected by default.
pub const DEFAULT_EXCLUDE_FILES: &[&str] = &["package-lock.json"];

/// Selection rule set
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct RuleSet {
    /// Allowed extensions, case-insensitive, leading dot optional.
    pub extensions: Vec<String>,
    /// Directory exclusions. A bare name matches one path segment exactly;
    /// an entry containing `/` matches as a substring of the relative
    /// directory path.
    pub exclude_dirs: Vec<String>,
    /// Exact file names to skip.
    pub exclude_files: Vec<String>,
    /// Glob include patterns; empty means no include filter.
    pub include: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| (*s).to_string()).collect(),
            exclude_files: DEFAULT_EXCLUDE_FILES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            include: Vec::new(),
        }
    }
}

impl RuleSet {
    /// Validate every entry of the rule set
    pub fn validate(&self) -> Result<(), TreepackError> {
        for ext in &self.extensions {
            if normalize_extension(ext).is_empty() {
                return Err(invalid("selectors.extensions", format!("empty extension '{ext}'")));
            }
        }

        for dir in &self.exclude_dirs {
            if dir.trim_matches('/').trim().is_empty() {
                return Err(invalid(
                    "selectors.exclude_dirs",
                    format!("empty directory pattern '{dir}'"),
                ));
            }
        }

        for name in &self.exclude_files {
            if name.trim().is_empty() || name.contains('/') {
                return Err(invalid(
                    "selectors.exclude_files",
                    format!("'{name}' is not a bare file name"),
                ));
            }
        }

        for pattern in &self.include {
            build_glob(pattern).map_err(|e| {
                invalid(
                    "selectors.include",
                    format!("Invalid glob pattern '{pattern}': {e}"),
                )
            })?;
        }

        Ok(())
    }
}

fn invalid(key: &str, value: String) -> TreepackError {
    TreepackError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Lowercase an extension and drop a leading dot.
pub(crate) fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Include patterns are matched against slash-separated relative paths;
/// a leading `./` carries no meaning there.
pub(crate) fn normalize_pattern(pattern: &str) -> &str {
    pattern.trim().trim_start_matches("./")
}

/// Case-sensitive glob in which `*` stays within one path segment and `**`
/// crosses directories.
pub(crate) fn build_glob(pattern: &str) -> Result<globset::Glob, globset::Error> {
    GlobBuilder::new(normalize_pattern(pattern))
        .literal_separator(true)
        .case_insensitive(false)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_validate() {
        RuleSet::default().validate().unwrap();
    }

    #[test]
    fn test_default_rules_cover_builtin_lists() {
        let rules = RuleSet::default();
        assert!(rules.extensions.iter().any(|e| e == "svelte"));
        assert!(rules.exclude_dirs.iter().any(|d| d == "node_modules"));
        assert!(rules.exclude_dirs.iter().any(|d| d == ".venv"));
        assert!(rules.exclude_dirs.iter().any(|d| d == "generated_data"));
        assert_eq!(rules.exclude_files, vec!["package-lock.json".to_string()]);
        assert!(rules.include.is_empty());
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let rules = RuleSet {
            include: vec!["src/[".to_string()],
            ..RuleSet::default()
        };
        let err = rules.validate().unwrap_err();
        assert!(matches!(
            err,
            TreepackError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "selectors.include"
        ));
    }

    #[test]
    fn test_empty_extension_rejected() {
        let rules = RuleSet {
            extensions: vec![".".to_string()],
            ..RuleSet::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_exclude_file_with_slash_rejected() {
        let rules = RuleSet {
            exclude_files: vec!["src/main.ts".to_string()],
            ..RuleSet::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".TS"), "ts");
        assert_eq!(normalize_extension("Json"), "json");
        assert_eq!(normalize_extension(" .md "), "md");
    }
}
