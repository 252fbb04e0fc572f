//! CLI command implementations.
//!
//! Each handler returns `anyhow::Result`; typed [`TreepackError`]s travel
//! inside it so `run` can pick the exit code.
//!
//! [`TreepackError`]: crate::TreepackError

mod bundle;
mod common;
mod config;
mod json_emit;
mod split;
mod tree;

pub use bundle::execute_bundle_command;
pub use config::execute_config_command;
pub use split::execute_split_command;
pub use tree::execute_tree_command;
