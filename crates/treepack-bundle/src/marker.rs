use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix of every marker line the bundler writes.
pub const MARKER_PREFIX: &str = "// File: ";

static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*//\s*File: ?(.+)$").expect("marker pattern is valid"));

/// Marker line for `rel`, newline included.
#[must_use]
pub fn marker_line(rel: &str) -> String {
    format!("{MARKER_PREFIX}{rel}\n")
}

/// Path named by a marker line, if `line` is one.
///
/// `line` must not carry its line terminator. Leading whitespace and any
/// spacing between `//` and `File:` are accepted. Only the one space after
/// `File:` is consumed; the rest of the line is the path, verbatim, so names
/// with leading or trailing spaces survive. A blank path is not a marker.
#[must_use]
pub fn parse_marker(line: &str) -> Option<&str> {
    let caps = MARKER_RE.captures(line)?;
    let path = caps.get(1)?.as_str();
    (!path.trim().is_empty()).then_some(path)
}
