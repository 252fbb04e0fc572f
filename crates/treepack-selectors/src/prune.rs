//! Directory pruning for include patterns.
//!
//! A directory is worth descending into only if some include pattern could
//! match a path below it. Each pattern is split into segments and compared
//! segment-wise against the directory's relative path. `**` matches any
//! remainder, so reaching one ends the analysis with "maybe".

use globset::{GlobBuilder, GlobMatcher};

#[derive(Debug, Clone)]
pub(crate) enum Segment {
    Literal(String),
    Wildcard(GlobMatcher),
    Recursive,
}

/// Segment-wise view of one include pattern.
#[derive(Debug, Clone)]
pub(crate) enum PatternPrefix {
    Segments(Vec<Segment>),
    /// Shapes the segment analysis cannot reason about (brace alternation,
    /// escapes). Never prunes.
    Opaque,
}

impl PatternPrefix {
    pub(crate) fn parse(pattern: &str) -> Self {
        let pattern = crate::normalize_pattern(pattern);
        if pattern.contains(['{', '}', '\\']) {
            return Self::Opaque;
        }

        let mut segments = Vec::new();
        for part in pattern.split('/').filter(|p| !p.is_empty()) {
            if part == "**" {
                segments.push(Segment::Recursive);
            } else if part.contains(['*', '?', '[']) {
                match GlobBuilder::new(part).literal_separator(true).build() {
                    Ok(glob) => segments.push(Segment::Wildcard(glob.compile_matcher())),
                    Err(_) => return Self::Opaque,
                }
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }

        Self::Segments(segments)
    }

    /// Whether a file strictly below `dir_segments` could match the pattern.
    pub(crate) fn may_match_below(&self, dir_segments: &[&str]) -> bool {
        match self {
            Self::Opaque => true,
            Self::Segments(segments) => prefix_allows(segments, dir_segments),
        }
    }
}

fn prefix_allows(segments: &[Segment], dir: &[&str]) -> bool {
    match (segments.first(), dir.first()) {
        (Some(Segment::Recursive), _) => true,
        // Directory consumed: a file below it needs at least one more segment.
        (Some(_), None) => true,
        (None, _) => false,
        (Some(Segment::Literal(lit)), Some(name)) => {
            lit == name && prefix_allows(&segments[1..], &dir[1..])
        }
        (Some(Segment::Wildcard(glob)), Some(name)) => {
            glob.is_match(name) && prefix_allows(&segments[1..], &dir[1..])
        }
    }
}
