use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// mkdir -p; treat `AlreadyExists` as success (removes TOCTTOU races)
pub fn ensure_dir_all<P: AsRef<Path>>(p: P) -> std::io::Result<()> {
    match std::fs::create_dir_all(&p) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

/// Render a relative path with forward slashes regardless of platform.
#[must_use]
pub fn to_slash(rel: &Utf8Path) -> String {
    rel.components()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// Key used everywhere treepack orders paths: case-insensitive first,
/// exact text second so the order stays total.
#[must_use]
pub fn sort_key(rel: &str) -> (String, String) {
    (rel.to_lowercase(), rel.to_string())
}

// ============================================================================
// Sandbox Error Types
// ============================================================================

/// Errors raised when a relative path would escape its sandbox root.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SandboxError {
    /// Failed to canonicalize the sandbox root path
    #[error("Failed to canonicalize sandbox root '{path}': {reason}")]
    RootCanonicalizationFailed { path: String, reason: String },

    /// Path is empty
    #[error("Empty path")]
    EmptyPath,

    /// Path contains ".." traversal components
    #[error("Path contains parent directory traversal: {path}")]
    ParentTraversal { path: String },

    /// Path is absolute
    #[error("Absolute path not allowed: {path}")]
    AbsolutePath { path: String },

    /// Path resolves outside the sandbox root
    #[error("Path escapes sandbox root: {path} resolves outside {root}")]
    EscapeAttempt { path: String, root: String },

    /// Failed to canonicalize an existing ancestor of the joined path
    #[error("Failed to canonicalize path '{path}': {reason}")]
    PathCanonicalizationFailed { path: String, reason: String },
}

// ============================================================================
// SandboxRoot - Validated root directory for split output
// ============================================================================

/// A validated root directory that joined paths cannot escape.
///
/// The root is canonicalized at construction time. [`SandboxRoot::join`]
/// rejects absolute paths and `..` components, and verifies that the
/// nearest existing ancestor of the joined path still lies under the root
/// (so a symlinked directory cannot redirect writes elsewhere).
#[derive(Debug, Clone)]
pub struct SandboxRoot {
    root: PathBuf,
}

impl SandboxRoot {
    /// Create a sandbox over an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let root_path = root.as_ref();
        let canonical =
            root_path
                .canonicalize()
                .map_err(|e| SandboxError::RootCanonicalizationFailed {
                    path: root_path.display().to_string(),
                    reason: e.to_string(),
                })?;

        Ok(Self { root: canonical })
    }

    /// Join a relative, slash-separated path, validating it stays within the sandbox.
    pub fn join(&self, rel: &str) -> Result<PathBuf, SandboxError> {
        let rel_path = Utf8Path::new(rel);

        if rel.trim().is_empty() {
            return Err(SandboxError::EmptyPath);
        }

        // A leading slash is absolute everywhere; a drive prefix only on Windows.
        if rel_path.is_absolute() || rel.starts_with('/') || rel.starts_with('\\') {
            return Err(SandboxError::AbsolutePath {
                path: rel.to_string(),
            });
        }

        let mut clean = Utf8PathBuf::new();
        for component in rel_path.components() {
            match component {
                Utf8Component::Normal(part) => clean.push(part),
                Utf8Component::CurDir => {}
                Utf8Component::ParentDir => {
                    return Err(SandboxError::ParentTraversal {
                        path: rel.to_string(),
                    });
                }
                Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                    return Err(SandboxError::AbsolutePath {
                        path: rel.to_string(),
                    });
                }
            }
        }
        if clean.as_str().is_empty() {
            return Err(SandboxError::EmptyPath);
        }

        let full_path = self.root.join(clean.as_std_path());
        self.validate_ancestor_within_sandbox(&full_path, rel)?;

        Ok(full_path)
    }

    /// Validate that the nearest existing ancestor of `full_path` stays
    /// within the sandbox when canonicalized.
    fn validate_ancestor_within_sandbox(
        &self,
        full_path: &Path,
        rel: &str,
    ) -> Result<(), SandboxError> {
        let mut ancestor = full_path.to_path_buf();
        while !ancestor.exists() {
            if !ancestor.pop() {
                return Ok(());
            }
        }

        let canonical_ancestor =
            ancestor
                .canonicalize()
                .map_err(|e| SandboxError::PathCanonicalizationFailed {
                    path: ancestor.display().to_string(),
                    reason: e.to_string(),
                })?;

        if !canonical_ancestor.starts_with(&self.root) {
            return Err(SandboxError::EscapeAttempt {
                path: rel.to_string(),
                root: self.root.display().to_string(),
            });
        }

        Ok(())
    }

    /// Get the canonicalized root path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_to_slash_joins_components() {
        let rel: Utf8PathBuf = ["src", "lib", "util.ts"].iter().collect();
        assert_eq!(to_slash(&rel), "src/lib/util.ts");
    }

    #[test]
    fn test_sort_key_is_case_insensitive_then_exact() {
        let mut paths = vec!["b.ts", "A.ts", "a.ts", "C/x.ts"];
        paths.sort_by_key(|p| sort_key(p));
        assert_eq!(paths, vec!["A.ts", "a.ts", "b.ts", "C/x.ts"]);
    }

    #[test]
    fn test_sandbox_join_accepts_nested_relative() {
        let temp = TempDir::new().unwrap();
        let root = SandboxRoot::new(temp.path()).unwrap();

        let joined = root.join("src/lib/util.ts").unwrap();
        assert!(joined.starts_with(root.as_path()));
        assert!(joined.ends_with("src/lib/util.ts"));
    }

    #[test]
    fn test_sandbox_join_rejects_parent_traversal() {
        let temp = TempDir::new().unwrap();
        let root = SandboxRoot::new(temp.path()).unwrap();

        assert!(matches!(
            root.join("../outside.txt"),
            Err(SandboxError::ParentTraversal { .. })
        ));
        assert!(matches!(
            root.join("a/../../outside.txt"),
            Err(SandboxError::ParentTraversal { .. })
        ));
    }

    #[test]
    fn test_sandbox_join_rejects_absolute() {
        let temp = TempDir::new().unwrap();
        let root = SandboxRoot::new(temp.path()).unwrap();

        assert!(matches!(
            root.join("/etc/passwd"),
            Err(SandboxError::AbsolutePath { .. })
        ));
    }

    #[test]
    fn test_sandbox_join_rejects_empty() {
        let temp = TempDir::new().unwrap();
        let root = SandboxRoot::new(temp.path()).unwrap();

        assert_eq!(root.join("  "), Err(SandboxError::EmptyPath));
        assert_eq!(root.join("./"), Err(SandboxError::EmptyPath));
    }

    #[cfg(unix)]
    #[test]
    fn test_sandbox_join_rejects_symlink_escape() {
        let outside = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();
        let root = SandboxRoot::new(temp.path()).unwrap();

        assert!(matches!(
            root.join("link/file.txt"),
            Err(SandboxError::EscapeAttempt { .. })
        ));
    }
}
