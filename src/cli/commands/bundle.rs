use anyhow::Result;

use super::common::select;
use super::json_emit::print_json;
use crate::{Bundler, Config};

/// Execute `treepack bundle`.
pub fn execute_bundle_command(config: &Config, json: bool) -> Result<()> {
    let output = config.output();
    let selection = select(config, Some(output))?;
    let report = Bundler::new(&selection).write_to(output)?;

    if json {
        return print_json(&report);
    }

    println!(
        "Bundled {} file(s) into {} ({} bytes, {} lines, blake3 {})",
        report.files,
        report.output,
        report.bytes,
        report.lines,
        &report.blake3[..16]
    );
    if !report.marker_collisions.is_empty() {
        println!(
            "  {} line(s) look like markers and will split incorrectly",
            report.marker_collisions.len()
        );
    }

    Ok(())
}
