use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use tracing::{debug, info, warn};
use treepack_utils::atomic_write::write_artifact;
use treepack_utils::error::TreepackError;
use treepack_utils::paths::{SandboxRoot, ensure_dir_all};

use crate::marker::parse_marker;

/// One file recovered from a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Path as written in the marker (verbatim, not yet validated).
    pub path: String,
    /// Raw content with original line endings.
    pub content: String,
}

/// Split a bundle into blocks.
///
/// Lines before the first marker are discarded. Each block ends at the next
/// marker or at end of input; a trailing empty line is the separator the
/// bundler wrote and is dropped.
#[must_use]
pub fn parse_bundle(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for raw in text.split_inclusive('\n') {
        if let Some(path) = parse_marker(strip_eol(raw)) {
            if let Some((prev, lines)) = current.take() {
                blocks.push(finish_block(prev, lines));
            }
            current = Some((path.to_string(), Vec::new()));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(raw);
        }
    }

    if let Some((path, lines)) = current {
        blocks.push(finish_block(path, lines));
    }

    blocks
}

fn finish_block(path: String, mut lines: Vec<&str>) -> Block {
    if lines.last().is_some_and(|last| strip_eol(last).is_empty()) {
        lines.pop();
    }
    Block {
        path,
        content: lines.concat(),
    }
}

fn strip_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Summary of one split run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitReport {
    pub out_dir: Utf8PathBuf,
    /// Paths written, in bundle order; a repeated path appears once per block.
    pub written: Vec<String>,
    /// Marker paths refused because they would escape `out_dir`.
    pub rejected: Vec<String>,
    pub bytes: usize,
}

/// Writes the blocks of a bundle under an output root.
#[derive(Debug, Clone)]
pub struct Splitter {
    out_dir: Utf8PathBuf,
}

impl Splitter {
    pub fn new(out_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Read `input` and split it.
    ///
    /// # Errors
    ///
    /// [`TreepackError::NotFound`] when `input` does not exist,
    /// [`TreepackError::Io`] when it cannot be read or a write fails.
    pub fn split_file(&self, input: &Utf8Path) -> Result<SplitReport, TreepackError> {
        let text = match fs::read_to_string(input) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TreepackError::NotFound {
                    path: input.to_string(),
                });
            }
            Err(e) => return Err(TreepackError::io(input, e)),
        };

        self.split_str(&text)
    }

    /// Split bundle text already in memory.
    pub fn split_str(&self, text: &str) -> Result<SplitReport, TreepackError> {
        ensure_dir_all(&self.out_dir).map_err(|e| TreepackError::io(&self.out_dir, e))?;
        let sandbox = SandboxRoot::new(&self.out_dir)
            .map_err(|e| TreepackError::io(&self.out_dir, io::Error::other(e)))?;

        let mut report = SplitReport {
            out_dir: self.out_dir.clone(),
            ..SplitReport::default()
        };
        let mut seen = HashSet::new();

        for block in parse_bundle(text) {
            let target = match sandbox.join(&block.path) {
                Ok(target) => target,
                Err(e) => {
                    warn!(path = %block.path, reason = %e, "refusing to write outside the output directory");
                    report.rejected.push(block.path);
                    continue;
                }
            };
            let target = Utf8PathBuf::from_path_buf(target).map_err(|p| {
                TreepackError::io(
                    p.display(),
                    io::Error::new(io::ErrorKind::InvalidData, "path is not UTF-8"),
                )
            })?;

            if !seen.insert(block.path.clone()) {
                warn!(path = %block.path, "path appears more than once; later block wins");
            }

            let written = write_artifact(&target, block.content.as_bytes())?;
            debug!(path = %block.path, bytes = written.bytes_written, "restored");

            report.bytes += written.bytes_written;
            report.written.push(block.path);
        }

        info!(
            out_dir = %report.out_dir,
            files = report.written.len(),
            rejected = report.rejected.len(),
            "split complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treepack_utils::test_support::{read_tree, temp_root};

    fn block(path: &str, content: &str) -> Block {
        Block {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_parse_drops_separator_and_keeps_final_block() {
        let blocks = parse_bundle("// File: x.txt\nhello\n\n// File: y.txt\nworld\n\n");
        assert_eq!(blocks, vec![block("x.txt", "hello\n"), block("y.txt", "world\n")]);
    }

    #[test]
    fn test_parse_discards_preamble() {
        let blocks = parse_bundle("generated by hand\n\n// File: a.md\n# A\n");
        assert_eq!(blocks, vec![block("a.md", "# A\n")]);
    }

    #[test]
    fn test_parse_keeps_interior_blank_lines() {
        let blocks = parse_bundle("// File: a.txt\none\n\n\ntwo\n\n\n");
        assert_eq!(blocks, vec![block("a.txt", "one\n\n\ntwo\n\n")]);
    }

    #[test]
    fn test_parse_empty_block() {
        let blocks = parse_bundle("// File: empty.txt\n// File: b.txt\nb\n");
        assert_eq!(blocks, vec![block("empty.txt", ""), block("b.txt", "b\n")]);
    }

    #[test]
    fn test_parse_preserves_crlf() {
        let blocks = parse_bundle("// File: w.cs\r\nclass A {}\r\n\r\n");
        assert_eq!(blocks, vec![block("w.cs", "class A {}\r\n")]);
    }

    #[test]
    fn test_parse_without_markers() {
        assert!(parse_bundle("just text\n").is_empty());
        assert!(parse_bundle("").is_empty());
    }

    #[test]
    fn test_split_scenario() {
        let (_temp, root) = temp_root();
        let out = root.join("restored");

        let report = Splitter::new(&out)
            .split_str("// File: x.txt\nhello\n\n// File: y.txt\nworld\n\n")
            .unwrap();

        assert_eq!(report.written, vec!["x.txt", "y.txt"]);
        let tree = read_tree(&out);
        assert_eq!(tree["x.txt"], "hello\n");
        assert_eq!(tree["y.txt"], "world\n");
    }

    #[test]
    fn test_split_creates_nested_dirs_and_overwrites() {
        let (_temp, root) = temp_root();
        let out = root.join("out");
        std::fs::create_dir_all(out.join("src")).unwrap();
        std::fs::write(out.join("src/a.ts"), "stale").unwrap();

        Splitter::new(&out)
            .split_str("// File: src/a.ts\nfresh\n\n// File: src/lib/b.ts\nb\n\n")
            .unwrap();

        let tree = read_tree(&out);
        assert_eq!(tree["src/a.ts"], "fresh\n");
        assert_eq!(tree["src/lib/b.ts"], "b\n");
    }

    #[test]
    fn test_split_rejects_escaping_paths() {
        let (_temp, root) = temp_root();
        let out = root.join("out");

        let report = Splitter::new(&out)
            .split_str("// File: ../evil.txt\nx\n\n// File: /etc/evil\ny\n\n// File: ok.txt\nz\n\n")
            .unwrap();

        assert_eq!(report.rejected, vec!["../evil.txt", "/etc/evil"]);
        assert_eq!(report.written, vec!["ok.txt"]);
        assert!(!root.join("evil.txt").exists());
    }

    #[test]
    fn test_split_missing_input_is_not_found() {
        let (_temp, root) = temp_root();

        let err = Splitter::new(root.join("out"))
            .split_file(&root.join("missing.txt"))
            .unwrap_err();

        assert!(matches!(err, TreepackError::NotFound { .. }));
        assert!(!root.join("out").exists());
    }
}
