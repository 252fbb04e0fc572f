//! Atomic file writes
//!
//! Every artifact treepack produces (bundle, tree listing, split output) is
//! written through here:
//! - Temporary file created in the target's directory
//! - Content written and fsynced
//! - Atomic rename over the target; the temp file shares its directory, so
//!   the rename never crosses filesystems
//!
//! Content is written byte-for-byte; line endings are never rewritten, since
//! a bundle must reproduce its sources exactly.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::io::Write;

use tempfile::NamedTempFile;

use crate::error::TreepackError;

/// Result of an atomic write operation
#[derive(Debug, Clone, Default)]
pub struct AtomicWriteResult {
    /// Number of bytes written
    pub bytes_written: usize,
}

/// Atomically write content to a file using temp file + fsync + rename.
///
/// The parent directory is created when missing. An existing file at `path`
/// is replaced only once the new content is fully on disk, so a failed run
/// leaves the previous file intact.
pub fn write_file_atomic(path: &Utf8Path, content: &[u8]) -> Result<AtomicWriteResult> {
    let parent = match path.parent() {
        Some(p) if !p.as_str().is_empty() => p,
        _ => Utf8Path::new("."),
    };
    crate::paths::ensure_dir_all(parent)
        .with_context(|| format!("Failed to create parent directory: {parent}"))?;

    let mut temp_file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in: {parent}"))?;

    temp_file
        .write_all(content)
        .with_context(|| "Failed to write content to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .with_context(|| "Failed to fsync temporary file")?;

    temp_file
        .persist(path.as_std_path())
        .map_err(|e| anyhow::anyhow!(e.error))
        .with_context(|| format!("Failed to atomically write file: {path}"))?;

    Ok(AtomicWriteResult {
        bytes_written: content.len(),
    })
}

/// [`write_file_atomic`] for library callers: failures become
/// [`TreepackError::Io`] naming `path`.
pub fn write_artifact(
    path: &Utf8Path,
    content: &[u8],
) -> std::result::Result<AtomicWriteResult, TreepackError> {
    write_file_atomic(path, content).map_err(|e| {
        let source = match e.root_cause().downcast_ref::<std::io::Error>() {
            Some(io) => std::io::Error::new(io.kind(), format!("{e:#}")),
            None => std::io::Error::other(format!("{e:#}")),
        };
        TreepackError::io(path, source)
    })
}
