//! Indented listing of the files a selection contains.
//!
//! ```text
//! * README.md
//! * src
//!   * app.ts
//!   * lib
//!     * util.ts
//! ```
//!
//! Within each directory its files come first, then its subdirectories,
//! each group ordered case-insensitively. Only directories holding at least
//! one selected file appear, and the start directory itself is not listed.

use camino::Utf8Path;
use treepack_utils::paths::sort_key;
use treepack_walker::Selection;

/// Directory node built from selected relative paths.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tree {
    files: Vec<String>,
    dirs: Vec<(String, Tree)>,
}

impl Tree {
    /// Build from slash-separated relative file paths.
    pub fn from_paths<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a Utf8Path>,
    {
        let mut root = Self::default();
        for path in paths {
            root.insert(path.as_str());
        }
        root.sort();
        root
    }

    #[must_use]
    pub fn from_selection(selection: &Selection) -> Self {
        Self::from_paths(selection.files.iter().map(|p| p.as_path()))
    }

    fn insert(&mut self, rel: &str) {
        match rel.split_once('/') {
            None => self.files.push(rel.to_string()),
            Some((dir, rest)) => {
                let idx = match self.dirs.iter().position(|(name, _)| name == dir) {
                    Some(idx) => idx,
                    None => {
                        self.dirs.push((dir.to_string(), Self::default()));
                        self.dirs.len() - 1
                    }
                };
                self.dirs[idx].1.insert(rest);
            }
        }
    }

    fn sort(&mut self) {
        self.files.sort_by_cached_key(|name| sort_key(name));
        self.dirs.sort_by_cached_key(|(name, _)| sort_key(name));
        for (_, child) in &mut self.dirs {
            child.sort();
        }
    }

    /// Number of listed entries (files plus directories), excluding the root.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.files.len()
            + self
                .dirs
                .iter()
                .map(|(_, child)| 1 + child.entry_count())
                .sum::<usize>()
    }

    /// Render one `"  " * depth + "* " + name` line per entry.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(0, &mut out);
        out
    }

    fn render_into(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        for file in &self.files {
            out.push_str(&indent);
            out.push_str("* ");
            out.push_str(file);
            out.push('\n');
        }
        for (name, child) in &self.dirs {
            out.push_str(&indent);
            out.push_str("* ");
            out.push_str(name);
            out.push('\n');
            child.render_into(depth + 1, out);
        }
    }
}

/// Render the tree listing for a selection.
#[must_use]
pub fn render_tree(selection: &Selection) -> String {
    Tree::from_selection(selection).render()
}
