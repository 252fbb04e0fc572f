use blake3::Hasher;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fs;
use tracing::{debug, info, warn};
use treepack_utils::atomic_write::write_artifact;
use treepack_utils::error::TreepackError;
use treepack_walker::Selection;

use crate::marker::{marker_line, parse_marker};

/// A content line that the splitter would mistake for a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerCollision {
    pub file: String,
    /// 1-based line number within the file.
    pub line: usize,
}

/// Summary of one bundle run.
#[derive(Debug, Clone, Serialize)]
pub struct BundleReport {
    pub output: Utf8PathBuf,
    pub files: usize,
    pub bytes: usize,
    pub lines: usize,
    /// BLAKE3 of the bundle content, hex-encoded.
    pub blake3: String,
    pub unmatched_includes: Vec<String>,
    pub marker_collisions: Vec<MarkerCollision>,
}

/// Renders a [`Selection`] into the bundle format.
#[derive(Debug)]
pub struct Bundler<'a> {
    selection: &'a Selection,
}

impl<'a> Bundler<'a> {
    #[must_use]
    pub const fn new(selection: &'a Selection) -> Self {
        Self { selection }
    }

    /// Build the bundle text in memory.
    ///
    /// Files are read in selection order. The first unreadable or non-UTF-8
    /// file aborts with [`TreepackError::Io`].
    pub fn render(&self) -> Result<(String, Vec<MarkerCollision>), TreepackError> {
        let mut bundle = String::new();
        let mut collisions = Vec::new();

        for rel in &self.selection.files {
            let full = self.selection.full_path(rel);
            let content = fs::read_to_string(&full).map_err(|e| TreepackError::io(&full, e))?;

            collisions.extend(find_collisions(rel.as_str(), &content));

            bundle.push_str(&marker_line(rel.as_str()));
            bundle.push_str(&content);
            if !content.ends_with('\n') {
                bundle.push('\n');
            }
            bundle.push('\n');

            debug!(path = %rel, bytes = content.len(), "bundled");
        }

        Ok((bundle, collisions))
    }

    /// Render and atomically write the bundle to `output`.
    ///
    /// Nothing is written when rendering fails, so an existing bundle at
    /// `output` survives a failed run.
    pub fn write_to(&self, output: &Utf8Path) -> Result<BundleReport, TreepackError> {
        let (bundle, marker_collisions) = self.render()?;

        for collision in &marker_collisions {
            warn!(
                file = %collision.file,
                line = collision.line,
                "content line looks like a marker; splitting this bundle will cut the file there"
            );
        }
        if self.selection.is_empty() {
            warn!(root = %self.selection.root, "no files selected; writing an empty bundle");
        }

        let written = write_artifact(output, bundle.as_bytes())?;

        let report = BundleReport {
            output: output.to_path_buf(),
            files: self.selection.files.len(),
            bytes: written.bytes_written,
            lines: bundle.matches('\n').count(),
            blake3: content_hash(&bundle),
            unmatched_includes: self.selection.unmatched_includes.clone(),
            marker_collisions,
        };

        info!(
            output = %report.output,
            files = report.files,
            bytes = report.bytes,
            blake3 = %report.blake3,
            "bundle written"
        );

        Ok(report)
    }
}

fn find_collisions(rel: &str, content: &str) -> Vec<MarkerCollision> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| parse_marker(line).is_some())
        .map(|(idx, _)| MarkerCollision {
            file: rel.to_string(),
            line: idx + 1,
        })
        .collect()
}

fn content_hash(content: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content.as_bytes());
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use treepack_selectors::{RuleMatcher, RuleSet};
    use treepack_utils::test_support::{read_tree, temp_root, write_tree};
    use treepack_walker::Walker;

    fn select(root: &Utf8Path, ext: &[&str]) -> Selection {
        let rules = RuleSet {
            extensions: ext.iter().map(|s| (*s).to_string()).collect(),
            ..RuleSet::default()
        };
        let matcher = RuleMatcher::new(&rules).unwrap();
        Walker::new(root, &matcher).walk().unwrap()
    }

    #[test]
    fn test_render_format() {
        let (_temp, root) = temp_root();
        write_tree(&root, &[("x.txt", "hello\n"), ("y.txt", "world")]);

        let selection = select(&root, &["txt"]);
        let (bundle, collisions) = Bundler::new(&selection).render().unwrap();

        assert_eq!(
            bundle,
            "// File: x.txt\nhello\n\n// File: y.txt\nworld\n\n"
        );
        assert!(collisions.is_empty());
    }

    #[test]
    fn test_nested_paths_use_forward_slashes() {
        let (_temp, root) = temp_root();
        write_tree(&root, &[("src/lib/util.ts", "export {}\n")]);

        let selection = select(&root, &["ts"]);
        let (bundle, _) = Bundler::new(&selection).render().unwrap();
        assert!(bundle.starts_with("// File: src/lib/util.ts\n"));
    }

    #[test]
    fn test_write_report() {
        let (_temp, root) = temp_root();
        write_tree(&root, &[("a.md", "# A\n"), ("b.md", "b")]);

        let selection = select(&root, &["md"]);
        let output = root.join("out/bundle.txt");
        let report = Bundler::new(&selection).write_to(&output).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(report.files, 2);
        assert_eq!(report.bytes, written.len());
        assert_eq!(report.lines, 6);
        assert_eq!(report.blake3, blake3::hash(written.as_bytes()).to_hex().to_string());
    }

    #[test]
    fn test_empty_selection_writes_empty_bundle() {
        let (_temp, root) = temp_root();
        write_tree(&root, &[("a.bin", "x")]);

        let selection = select(&root, &["md"]);
        let output = root.join("bundle.txt");
        let report = Bundler::new(&selection).write_to(&output).unwrap();

        assert_eq!(report.files, 0);
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn test_marker_collisions_are_reported() {
        let (_temp, root) = temp_root();
        write_tree(
            &root,
            &[("notes.md", "intro\n  // File: fake.txt\nmore\n")],
        );

        let selection = select(&root, &["md"]);
        let report = Bundler::new(&selection)
            .write_to(&root.join("b.txt"))
            .unwrap();

        assert_eq!(
            report.marker_collisions,
            vec![MarkerCollision {
                file: "notes.md".to_string(),
                line: 2
            }]
        );
    }

    #[test]
    fn test_invalid_utf8_is_io_error_and_keeps_previous_output() {
        let (_temp, root) = temp_root();
        write_tree(&root, &[("good.txt", "ok\n")]);
        fs::write(root.join("bad.txt"), [0xff, 0xfe, 0x00]).unwrap();
        let output = root.join("out.bundle");
        fs::write(&output, "previous").unwrap();

        let selection = select(&root, &["txt"]);
        let err = Bundler::new(&selection).write_to(&output).unwrap_err();

        assert!(matches!(err, TreepackError::Io { ref path, .. } if path.ends_with("bad.txt")));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
    }

    #[test]
    fn test_round_trip_keeps_leading_space_in_names() {
        let (_temp, root) = temp_root();
        let src = root.join("src");
        write_tree(&src, &[(" notes.txt", "spaced\n"), ("plain.txt", "plain")]);

        let selection = select(&src, &["txt"]);
        assert_eq!(
            selection.files,
            vec![Utf8PathBuf::from(" notes.txt"), Utf8PathBuf::from("plain.txt")]
        );

        let bundle = root.join("bundle.txt");
        Bundler::new(&selection).write_to(&bundle).unwrap();
        let out = root.join("restored");
        let report = crate::Splitter::new(&out).split_file(&bundle).unwrap();

        assert_eq!(report.written, vec![" notes.txt", "plain.txt"]);
        let restored = read_tree(&out);
        assert_eq!(restored[" notes.txt"], "spaced\n");
        assert_eq!(restored["plain.txt"], "plain\n");
        assert!(!out.join("notes.txt").exists());
    }
}
