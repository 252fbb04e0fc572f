use std::collections::HashSet;
use std::fmt;

use globset::{GlobSet, GlobSetBuilder};
use treepack_utils::error::{ConfigError, TreepackError};

use crate::prune::PatternPrefix;
use crate::{RuleSet, build_glob, normalize_extension, normalize_pattern};

/// Outcome of evaluating one relative file path against the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Selected,
    /// An ancestor directory matched this exclusion pattern.
    ExcludedDirectory(String),
    /// The basename is on the exclusion list.
    ExcludedFile,
    /// The extension is missing or not on the allow-list.
    ExtensionNotAllowed,
    /// Include patterns are set and none matched.
    NoIncludeMatch,
}

impl Decision {
    #[must_use]
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selected => write!(f, "selected"),
            Self::ExcludedDirectory(pattern) => write!(f, "inside excluded directory '{pattern}'"),
            Self::ExcludedFile => write!(f, "file name excluded"),
            Self::ExtensionNotAllowed => write!(f, "extension not allowed"),
            Self::NoIncludeMatch => write!(f, "no include pattern matched"),
        }
    }
}

#[derive(Debug, Clone)]
struct IncludeRules {
    patterns: Vec<String>,
    set: GlobSet,
    prefixes: Vec<PatternPrefix>,
}

/// Compiled form of a [`RuleSet`].
///
/// All paths handed to the matcher are relative to the start directory and
/// slash-separated.
#[derive(Debug, Clone)]
pub struct RuleMatcher {
    extensions: HashSet<String>,
    dir_names: HashSet<String>,
    dir_paths: Vec<String>,
    file_names: HashSet<String>,
    include: Option<IncludeRules>,
}

impl RuleMatcher {
    /// Validate and compile a rule set.
    pub fn new(rules: &RuleSet) -> Result<Self, TreepackError> {
        rules.validate()?;

        let extensions = rules
            .extensions
            .iter()
            .map(|e| normalize_extension(e))
            .collect();

        let mut dir_names = HashSet::new();
        let mut dir_paths = Vec::new();
        for pattern in &rules.exclude_dirs {
            let pattern = pattern.trim().trim_matches('/');
            if pattern.contains('/') {
                dir_paths.push(pattern.to_string());
            } else {
                dir_names.insert(pattern.to_string());
            }
        }

        let file_names = rules
            .exclude_files
            .iter()
            .map(|n| n.trim().to_string())
            .collect();

        let include = if rules.include.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &rules.include {
                // validate() already compiled each pattern once
                builder.add(build_glob(pattern).map_err(|e| invalid_include(pattern, &e))?);
            }
            let set = builder.build().map_err(|e| invalid_include("<set>", &e))?;

            Some(IncludeRules {
                patterns: rules
                    .include
                    .iter()
                    .map(|p| normalize_pattern(p).to_string())
                    .collect(),
                set,
                prefixes: rules.include.iter().map(|p| PatternPrefix::parse(p)).collect(),
            })
        };

        Ok(Self {
            extensions,
            dir_names,
            dir_paths,
            file_names,
            include,
        })
    }

    /// Include patterns in configuration order (normalized).
    #[must_use]
    pub fn include_patterns(&self) -> &[String] {
        self.include.as_ref().map_or(&[], |i| i.patterns.as_slice())
    }

    /// Return the exclusion pattern matching `rel_dir`, if any.
    ///
    /// Bare names are compared with each segment exactly; patterns with a
    /// `/` match anywhere inside the directory path.
    #[must_use]
    pub fn excluded_dir_pattern(&self, rel_dir: &str) -> Option<String> {
        if rel_dir.is_empty() {
            return None;
        }

        if let Some(segment) = rel_dir.split('/').find(|s| self.dir_names.contains(*s)) {
            return Some(segment.to_string());
        }

        self.dir_paths
            .iter()
            .find(|p| rel_dir.contains(p.as_str()))
            .cloned()
    }

    /// Whether traversal should descend into `rel_dir` for the include patterns.
    ///
    /// Always true when no include patterns are configured.
    #[must_use]
    pub fn dir_may_contain_match(&self, rel_dir: &str) -> bool {
        let Some(include) = &self.include else {
            return true;
        };
        let segments: Vec<&str> = rel_dir.split('/').filter(|s| !s.is_empty()).collect();
        include
            .prefixes
            .iter()
            .any(|prefix| prefix.may_match_below(&segments))
    }

    /// Evaluate one relative file path against every rule.
    #[must_use]
    pub fn evaluate(&self, rel_file: &str) -> Decision {
        let (parent, name) = match rel_file.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", rel_file),
        };

        if let Some(pattern) = self.excluded_dir_pattern(parent) {
            return Decision::ExcludedDirectory(pattern);
        }

        if self.file_names.contains(name) {
            return Decision::ExcludedFile;
        }

        if !self.extension_allowed(name) {
            return Decision::ExtensionNotAllowed;
        }

        match &self.include {
            Some(include) if !include.set.is_match(rel_file) => Decision::NoIncludeMatch,
            _ => Decision::Selected,
        }
    }

    /// Indices (into [`include_patterns`](Self::include_patterns)) of the
    /// include patterns matching `rel_file`.
    #[must_use]
    pub fn matching_includes(&self, rel_file: &str) -> Vec<usize> {
        self.include
            .as_ref()
            .map(|i| i.set.matches(rel_file))
            .unwrap_or_default()
    }

    fn extension_allowed(&self, name: &str) -> bool {
        // Dotfiles such as `.gitignore` have no extension.
        let Some((stem, ext)) = name.rsplit_once('.') else {
            return false;
        };
        if stem.is_empty() || ext.is_empty() {
            return false;
        }
        self.extensions.contains(&ext.to_lowercase())
    }
}

fn invalid_include(pattern: &str, err: &globset::Error) -> TreepackError {
    TreepackError::Config(ConfigError::InvalidValue {
        key: "selectors.include".to_string(),
        value: format!("Invalid glob pattern '{pattern}': {err}"),
    })
}
