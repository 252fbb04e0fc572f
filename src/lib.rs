//! treepack - bundle a source tree into one marker-delimited text file, and
//! split such a file back into a tree.
//!
//! treepack can be used in two ways:
//! - **CLI**: `treepack bundle`, `treepack tree`, `treepack split`, `treepack config`
//! - **Library**: drive the [`Walker`], [`Bundler`], [`Splitter`] and [`Tree`]
//!   directly
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Bundle the current directory into .treepack/bundle.txt
//! treepack bundle
//!
//! # Only TypeScript under src/, written somewhere else
//! treepack --ext ts --include 'src/**' bundle -o /tmp/context.txt
//!
//! # Show what would be bundled
//! treepack tree
//!
//! # Restore files from a bundle
//! treepack split /tmp/context.txt -d restored/
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use treepack::{Bundler, RuleMatcher, RuleSet, Walker};
//! use camino::Utf8Path;
//!
//! let matcher = RuleMatcher::new(&RuleSet::default())?;
//! let selection = Walker::new(".", &matcher).walk()?;
//! let report = Bundler::new(&selection).write_to(Utf8Path::new("bundle.txt"))?;
//! println!("{} files, blake3 {}", report.files, report.blake3);
//! # Ok::<(), treepack::TreepackError>(())
//! ```
//!
//! # Configuration
//!
//! Precedence is CLI flags > `.treepack/config.toml` > built-in defaults.
//! See [`Config`].

pub mod cli;

pub use treepack_bundle::{
    Block, BundleReport, Bundler, MARKER_PREFIX, MarkerCollision, SplitReport, Splitter,
    marker_line, parse_bundle, parse_marker,
};
pub use treepack_config::{CliArgs, Config, ConfigSource, Defaults};
pub use treepack_selectors::{Decision, RuleMatcher, RuleSet};
pub use treepack_tree::{Tree, render_tree};
pub use treepack_utils::error::{ConfigError, ErrorCategory, TreepackError, UserFriendlyError};
pub use treepack_utils::exit_codes::ExitCode;
pub use treepack_walker::{Selection, Walker};
