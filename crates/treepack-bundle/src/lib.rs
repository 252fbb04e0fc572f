//! Bundle format: writing a selection into one marker-delimited text file,
//! and splitting such a file back into a directory tree.
//!
//! ```text
//! // File: src/app.ts
//! <content, newline-terminated>
//! <blank line>
//! // File: src/lib/util.ts
//! ...
//! ```
//!
//! A content line that itself looks like a marker cannot be told apart from
//! a real one when splitting; [`Bundler`] warns about such lines.

mod bundler;
mod marker;
mod splitter;

pub use bundler::{BundleReport, Bundler, MarkerCollision};
pub use marker::{MARKER_PREFIX, marker_line, parse_marker};
pub use splitter::{Block, SplitReport, Splitter, parse_bundle};
