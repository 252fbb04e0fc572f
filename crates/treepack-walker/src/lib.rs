//! Recursive traversal of a start directory.
//!
//! The [`Walker`] applies a compiled [`RuleMatcher`] to every entry below the
//! start directory and returns a [`Selection`]: the selected files as
//! slash-separated relative paths in case-insensitive order.
//!
//! Excluded directories are never descended into. Symlinked directories are
//! not followed; symlinked files count as files.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;
use std::io;
use tracing::{debug, warn};
use treepack_selectors::RuleMatcher;
use treepack_utils::error::{ConfigError, TreepackError};
use treepack_utils::logging::{
    log_dir_pruned, log_file_selected, log_file_skipped, log_unmatched_patterns,
};
use treepack_utils::paths::{sort_key, to_slash};

/// Result of one traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Start directory as given.
    pub root: Utf8PathBuf,
    /// Selected files relative to `root`, slash-separated and sorted.
    pub files: Vec<Utf8PathBuf>,
    /// Include patterns that matched no file, in configuration order.
    pub unmatched_includes: Vec<String>,
    /// Subdirectories that could not be listed.
    pub skipped_dirs: Vec<Utf8PathBuf>,
}

impl Selection {
    /// Absolute (root-joined) path of a selected file.
    #[must_use]
    pub fn full_path(&self, rel: &Utf8Path) -> Utf8PathBuf {
        self.root.join(rel)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Walks a start directory with a fixed rule matcher.
#[derive(Debug)]
pub struct Walker<'a> {
    root: Utf8PathBuf,
    matcher: &'a RuleMatcher,
    skip: HashSet<String>,
}

#[derive(Default)]
struct WalkState {
    files: Vec<String>,
    include_hits: Vec<bool>,
    skipped_dirs: Vec<Utf8PathBuf>,
}

impl<'a> Walker<'a> {
    pub fn new(root: impl Into<Utf8PathBuf>, matcher: &'a RuleMatcher) -> Self {
        Self {
            root: root.into(),
            matcher,
            skip: HashSet::new(),
        }
    }

    /// Never select the file at `rel` (slash-separated, relative to the root).
    #[must_use]
    pub fn skip_path(mut self, rel: impl Into<String>) -> Self {
        self.skip.insert(rel.into());
        self
    }

    /// Traverse the start directory.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::StartDirNotFound`] / [`ConfigError::StartDirNotDirectory`]
    ///   before anything is read
    /// - [`TreepackError::Io`] when the start directory itself cannot be listed
    pub fn walk(&self) -> Result<Selection, TreepackError> {
        self.check_root()?;

        let mut state = WalkState {
            include_hits: vec![false; self.matcher.include_patterns().len()],
            ..WalkState::default()
        };

        let entries = fs::read_dir(&self.root).map_err(|e| TreepackError::io(&self.root, e))?;
        self.visit(entries, "", &mut state);

        state.files.sort_by_cached_key(|p| sort_key(p));

        let unmatched_includes: Vec<String> = self
            .matcher
            .include_patterns()
            .iter()
            .zip(&state.include_hits)
            .filter(|(_, hit)| !**hit)
            .map(|(pattern, _)| pattern.clone())
            .collect();
        log_unmatched_patterns(&unmatched_includes);

        debug!(
            root = %self.root,
            selected = state.files.len(),
            skipped_dirs = state.skipped_dirs.len(),
            "walk complete"
        );

        Ok(Selection {
            root: self.root.clone(),
            files: state.files.into_iter().map(Utf8PathBuf::from).collect(),
            unmatched_includes,
            skipped_dirs: state.skipped_dirs,
        })
    }

    fn check_root(&self) -> Result<(), TreepackError> {
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ConfigError::StartDirNotDirectory {
                path: self.root.to_string(),
            }
            .into()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ConfigError::StartDirNotFound {
                path: self.root.to_string(),
            }
            .into()),
            Err(e) => Err(TreepackError::io(&self.root, e)),
        }
    }

    fn visit(&self, entries: fs::ReadDir, rel_dir: &str, state: &mut WalkState) {
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %display_rel(rel_dir), error = %e, "failed to read directory entry");
                    continue;
                }
            };

            let Ok(name) = entry.file_name().into_string() else {
                warn!(
                    dir = %display_rel(rel_dir),
                    name = %entry.file_name().to_string_lossy(),
                    "skipping entry with non-UTF-8 name"
                );
                continue;
            };
            let rel = if rel_dir.is_empty() {
                name
            } else {
                format!("{rel_dir}/{name}")
            };

            match classify(&entry) {
                EntryKind::Dir => self.enter_dir(&rel, state),
                EntryKind::File => self.consider_file(rel, state),
                EntryKind::SymlinkedDir => log_dir_pruned(&rel, "symlinked directory not followed"),
                EntryKind::Other => log_file_skipped(&rel, "not a regular file"),
            }
        }
    }

    fn enter_dir(&self, rel: &str, state: &mut WalkState) {
        if let Some(pattern) = self.matcher.excluded_dir_pattern(rel) {
            log_dir_pruned(rel, &format!("matches exclusion '{pattern}'"));
            return;
        }
        if !self.matcher.dir_may_contain_match(rel) {
            log_dir_pruned(rel, "no include pattern can match below");
            return;
        }

        let abs = self.root.join(rel);
        match fs::read_dir(&abs) {
            Ok(entries) => self.visit(entries, rel, state),
            Err(e) => {
                warn!(dir = %rel, error = %e, "skipping unreadable directory");
                state.skipped_dirs.push(Utf8PathBuf::from(rel));
            }
        }
    }

    fn consider_file(&self, rel: String, state: &mut WalkState) {
        if self.skip.contains(&rel) {
            log_file_skipped(&rel, "output of this run");
            return;
        }

        let decision = self.matcher.evaluate(&rel);
        if !decision.is_selected() {
            log_file_skipped(&rel, &decision.to_string());
            return;
        }

        for idx in self.matcher.matching_includes(&rel) {
            state.include_hits[idx] = true;
        }
        log_file_selected(&rel);
        state.files.push(rel);
    }
}

enum EntryKind {
    Dir,
    File,
    SymlinkedDir,
    Other,
}

fn classify(entry: &fs::DirEntry) -> EntryKind {
    let Ok(file_type) = entry.file_type() else {
        return EntryKind::Other;
    };

    if file_type.is_dir() {
        EntryKind::Dir
    } else if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_symlink() {
        // Follow only to learn what the link points at.
        match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_file() => EntryKind::File,
            Ok(meta) if meta.is_dir() => EntryKind::SymlinkedDir,
            _ => EntryKind::Other,
        }
    } else {
        EntryKind::Other
    }
}

fn display_rel(rel_dir: &str) -> &str {
    if rel_dir.is_empty() { "." } else { rel_dir }
}

/// Path of `target` relative to `root` when it lies inside it.
///
/// `target` need not exist yet; its parent directory is resolved instead.
/// Used to keep a run's own output file out of its selection.
#[must_use]
pub fn relative_within(root: &Utf8Path, target: &Utf8Path) -> Option<String> {
    let root = root.canonicalize_utf8().ok()?;
    let name = target.file_name()?;
    let parent = match target.parent() {
        Some(p) if !p.as_str().is_empty() => p,
        _ => Utf8Path::new("."),
    };
    let parent = parent.canonicalize_utf8().ok()?;
    let rel = parent.join(name).strip_prefix(&root).ok()?.to_path_buf();
    Some(to_slash(&rel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use treepack_selectors::RuleSet;
    use treepack_utils::test_support::{temp_root, write_tree};

    fn rules(ext: &[&str], dirs: &[&str], include: &[&str]) -> RuleSet {
        RuleSet {
            extensions: ext.iter().map(|s| (*s).to_string()).collect(),
            exclude_dirs: dirs.iter().map(|s| (*s).to_string()).collect(),
            exclude_files: vec!["package-lock.json".to_string()],
            include: include.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn walk(root: &Utf8Path, rules: &RuleSet) -> Selection {
        let matcher = RuleMatcher::new(rules).unwrap();
        Walker::new(root, &matcher).walk().unwrap()
    }

    fn names(selection: &Selection) -> Vec<&str> {
        selection.files.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn test_selects_by_extension_and_prunes_excluded_dirs() {
        let (_temp, root) = temp_root();
        write_tree(
            &root,
            &[("a.json", "{}"), ("b.tmp", "x"), ("node_modules/c.json", "{}")],
        );

        let selection = walk(&root, &rules(&["json"], &["node_modules"], &[]));
        assert_eq!(names(&selection), vec!["a.json"]);
    }

    #[test]
    fn test_sentinels_in_excluded_dirs_never_appear() {
        let (_temp, root) = temp_root();
        write_tree(
            &root,
            &[
                ("src/keep.ts", ""),
                ("bin/SENTINEL.ts", ""),
                ("src/obj/SENTINEL.ts", ""),
                ("src/generated/api/SENTINEL.ts", ""),
                ("lib/src/generated/SENTINEL.ts", ""),
                ("gen/keep.ts", ""),
            ],
        );

        let selection = walk(&root, &rules(&["ts"], &["bin", "obj", "src/generated/"], &[]));
        assert_eq!(names(&selection), vec!["gen/keep.ts", "src/keep.ts"]);
    }

    #[test]
    fn test_excluded_file_names_skipped_at_any_depth() {
        let (_temp, root) = temp_root();
        write_tree(
            &root,
            &[("package-lock.json", "{}"), ("web/package-lock.json", "{}"), ("web/package.json", "{}")],
        );

        let selection = walk(&root, &rules(&["json"], &[], &[]));
        assert_eq!(names(&selection), vec!["web/package.json"]);
    }

    #[test]
    fn test_order_is_case_insensitive() {
        let (_temp, root) = temp_root();
        write_tree(
            &root,
            &[("b.md", ""), ("A.md", ""), ("a/z.md", ""), ("C.md", "")],
        );

        let selection = walk(&root, &rules(&["md"], &[], &[]));
        // '.' sorts before '/', so "A.md" precedes "a/z.md".
        assert_eq!(names(&selection), vec!["A.md", "a/z.md", "b.md", "C.md"]);
    }

    #[test]
    fn test_include_patterns_and_unmatched_report() {
        let (_temp, root) = temp_root();
        write_tree(
            &root,
            &[("src/app.ts", ""), ("src/lib/util.ts", ""), ("docs/guide.md", "")],
        );

        let selection = walk(&root, &rules(&["ts", "md"], &[], &["src/**/*.ts", "tools/*.ts"]));
        assert_eq!(names(&selection), vec!["src/app.ts", "src/lib/util.ts"]);
        assert_eq!(selection.unmatched_includes, vec!["tools/*.ts"]);
    }

    #[test]
    fn test_non_matching_include_selects_nothing() {
        let (_temp, root) = temp_root();
        write_tree(&root, &[("a.ts", "")]);

        let selection = walk(&root, &rules(&["ts"], &[], &["nothing/**"]));
        assert!(selection.is_empty());
        assert_eq!(selection.unmatched_includes, vec!["nothing/**"]);
    }

    #[test]
    fn test_skip_path_excludes_output_file() {
        let (_temp, root) = temp_root();
        write_tree(&root, &[("a.txt", "a"), ("out/bundle.txt", "old")]);

        let rules = rules(&["txt"], &[], &[]);
        let matcher = RuleMatcher::new(&rules).unwrap();
        let selection = Walker::new(&root, &matcher)
            .skip_path("out/bundle.txt")
            .walk()
            .unwrap();
        assert_eq!(names(&selection), vec!["a.txt"]);
    }

    #[test]
    fn test_missing_start_dir_is_config_error() {
        let (_temp, root) = temp_root();
        let matcher = RuleMatcher::new(&RuleSet::default()).unwrap();

        let err = Walker::new(root.join("missing"), &matcher).walk().unwrap_err();
        assert!(matches!(
            err,
            TreepackError::Config(ConfigError::StartDirNotFound { .. })
        ));
    }

    #[test]
    fn test_file_as_start_dir_is_config_error() {
        let (_temp, root) = temp_root();
        write_tree(&root, &[("file.txt", "")]);
        let matcher = RuleMatcher::new(&RuleSet::default()).unwrap();

        let err = Walker::new(root.join("file.txt"), &matcher).walk().unwrap_err();
        assert!(matches!(
            err,
            TreepackError::Config(ConfigError::StartDirNotDirectory { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dirs_not_followed() {
        let (_temp, root) = temp_root();
        write_tree(&root, &[("real/a.txt", ""), ("b.txt", "")]);
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();
        std::os::unix::fs::symlink(root.join("b.txt"), root.join("c.txt")).unwrap();

        let selection = walk(&root, &rules(&["txt"], &[], &[]));
        assert_eq!(names(&selection), vec!["b.txt", "c.txt", "real/a.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, root) = temp_root();
        write_tree(&root, &[("a.txt", ""), ("locked/hidden.txt", ""), ("open/b.txt", "")]);
        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can list the directory regardless.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let matcher = RuleMatcher::new(&rules(&["txt"], &[], &[])).unwrap();
        let result = Walker::new(&root, &matcher).walk();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let selection = result.unwrap();
        assert_eq!(names(&selection), vec!["a.txt", "open/b.txt"]);
        assert_eq!(selection.skipped_dirs, vec![Utf8PathBuf::from("locked")]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_temp, root) = temp_root();
        write_tree(&root, &[("ok.txt", "")]);
        let bad = root.as_std_path().join(OsStr::from_bytes(b"bad\xff.txt"));
        std::fs::write(bad, "").unwrap();

        let selection = walk(&root, &rules(&["txt"], &[], &[]));
        assert_eq!(names(&selection), vec!["ok.txt"]);
    }

    #[test]
    fn test_relative_within() {
        let (_temp, root) = temp_root();
        write_tree(&root, &[("out/keep", "")]);

        assert_eq!(
            relative_within(&root, &root.join("out/bundle.txt")),
            Some("out/bundle.txt".to_string())
        );
        assert_eq!(relative_within(&root.join("out"), &root.join("x.txt")), None);
        assert_eq!(relative_within(&root, &root.join("missing/x.txt")), None);
    }
}
