use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

use super::json_emit::print_json;
use crate::Config;

#[derive(Serialize)]
struct ConfigValue {
    value: String,
    source: String,
}

#[derive(Serialize)]
struct ConfigJsonOutput {
    config_file: Option<String>,
    values: BTreeMap<String, ConfigValue>,
}

/// Execute `treepack config`.
pub fn execute_config_command(config: &Config, json: bool) -> Result<()> {
    let effective = config.effective_config();

    if json {
        let values = effective
            .into_iter()
            .map(|(key, (value, source))| (key, ConfigValue { value, source }))
            .collect();
        return print_json(&ConfigJsonOutput {
            config_file: config.config_file.as_ref().map(ToString::to_string),
            values,
        });
    }

    match &config.config_file {
        Some(path) => println!("Config file: {path}"),
        None => println!("Config file: none (built-in defaults)"),
    }
    let width = effective.keys().map(String::len).max().unwrap_or(0);
    for (key, (value, source)) in &effective {
        println!("  {key:<width$} = {value}  [{source}]");
    }

    Ok(())
}
