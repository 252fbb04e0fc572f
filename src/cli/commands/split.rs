use anyhow::Result;
use camino::Utf8Path;

use super::json_emit::print_json;
use crate::{Config, Splitter};

/// Execute `treepack split`.
pub fn execute_split_command(config: &Config, input: &Utf8Path, json: bool) -> Result<()> {
    let report = Splitter::new(config.split_dir()).split_file(input)?;

    if json {
        return print_json(&report);
    }

    println!(
        "Restored {} file(s) into {} ({} bytes)",
        report.written.len(),
        report.out_dir,
        report.bytes
    );
    if !report.rejected.is_empty() {
        println!(
            "  {} block(s) skipped: path would leave the output directory",
            report.rejected.len()
        );
    }

    Ok(())
}
