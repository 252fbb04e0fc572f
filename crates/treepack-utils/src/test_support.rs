//! Fixture helpers shared by unit and integration tests.
//!
//! Available under `cfg(test)` and the `test-utils` feature.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Create a temporary directory and return it with its UTF-8 path.
///
/// # Panics
///
/// Panics if the temp dir cannot be created or its path is not UTF-8.
#[must_use]
pub fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp dir path is UTF-8");
    (dir, path)
}

/// Write `files` (slash-separated relative path, content) under `root`,
/// creating intermediate directories.
///
/// # Panics
///
/// Panics on any I/O failure.
pub fn write_tree(root: impl AsRef<Path>, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.as_ref().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture directory");
        }
        fs::write(&path, content).expect("write fixture file");
    }
}

/// Read every regular file under `root` into a map keyed by slash-separated
/// relative path.
///
/// # Panics
///
/// Panics on any I/O failure or non-UTF-8 content.
#[must_use]
pub fn read_tree(root: &Utf8Path) -> BTreeMap<String, String> {
    fn visit(root: &Utf8Path, dir: &Utf8Path, out: &mut BTreeMap<String, String>) {
        for entry in dir.read_dir_utf8().expect("read fixture dir") {
            let entry = entry.expect("fixture dir entry");
            let path = entry.path();
            if path.is_dir() {
                visit(root, path, out);
            } else {
                let rel = path.strip_prefix(root).expect("path under root");
                let content = fs::read_to_string(path).expect("read fixture file");
                out.insert(crate::paths::to_slash(rel), content);
            }
        }
    }

    let mut out = BTreeMap::new();
    visit(root, root, &mut out);
    out
}
