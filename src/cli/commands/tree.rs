use anyhow::Result;
use camino::Utf8Path;
use serde::Serialize;
use tracing::info;
use treepack_utils::atomic_write::write_artifact;

use super::common::select;
use super::json_emit::print_json;
use crate::{Config, Tree};

#[derive(Serialize)]
struct TreeJsonOutput<'a> {
    files: usize,
    entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Utf8Path>,
    lines: Vec<&'a str>,
}

/// Execute `treepack tree`.
///
/// Without `--output` the listing itself goes to stdout and the summary to
/// the log, so the listing can be piped.
pub fn execute_tree_command(config: &Config, output: Option<&Utf8Path>, json: bool) -> Result<()> {
    let selection = select(config, output)?;
    let tree = Tree::from_selection(&selection);
    let rendered = tree.render();

    if let Some(path) = output {
        write_artifact(path, rendered.as_bytes())?;
    }

    if json {
        return print_json(&TreeJsonOutput {
            files: selection.files.len(),
            entries: tree.entry_count(),
            output,
            lines: rendered.lines().collect(),
        });
    }

    match output {
        Some(path) => println!(
            "Listed {} file(s) in {} entries into {path}",
            selection.files.len(),
            tree.entry_count()
        ),
        None => {
            print!("{rendered}");
            info!(files = selection.files.len(), entries = tree.entry_count(), "tree listed");
        }
    }

    Ok(())
}
