//! JSON summaries printed with `--json`.

use anyhow::{Context, Result};
use serde::Serialize;

/// Serialize `value` as pretty JSON and print it on stdout.
pub(super) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?;
    println!("{json}");
    Ok(())
}
