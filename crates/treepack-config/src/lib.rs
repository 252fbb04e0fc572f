//! Configuration management for treepack
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. The TOML file lives at `.treepack/config.toml` and
//! has two optional sections, `[defaults]` and `[selectors]`.

mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use cli_args::CliArgs;
pub use model::*;
pub use treepack_selectors::RuleSet;
