//! Path pattern compilation and matching.
//!
//! # Syntax
//! - Literal segment: matches itself exactly (case-sensitive)
//! - `*`: exactly one non-empty segment
//! - `{name}`: one non-empty segment, named for readability
//! - `**`: zero or more segments, only allowed as the final segment
//!
//! # Design Decisions
//! - Patterns are compiled once at startup
//! - No regex in the hot path (segment comparison only)
//! - A single trailing slash on the request path is ignored

use std::collections::HashSet;
use std::fmt;

/// Reasons a path pattern fails to compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern {0:?} contains an empty segment")]
    EmptySegment(String),

    #[error("'**' must be the last segment of {0:?}")]
    MisplacedDoubleWildcard(String),

    #[error("invalid segment {segment:?} in pattern {pattern:?}")]
    InvalidSegment { pattern: String, segment: String },

    #[error("variable {name:?} appears twice in pattern {pattern:?}")]
    DuplicateVariable { pattern: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Variable(String),
}

impl Segment {
    fn accepts(&self, part: &str) -> bool {
        match self {
            Segment::Literal(expected) => expected == part,
            Segment::Any | Segment::Variable(_) => !part.is_empty(),
        }
    }
}

/// A compiled path pattern such as `/api/users/**`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
    trailing_wildcard: bool,
}

impl PathPattern {
    /// Compile a pattern, rejecting anything outside the supported syntax.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let rest = source
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(source.to_string()))?;

        let mut segments = Vec::new();
        let mut trailing_wildcard = false;
        let mut variables = HashSet::new();

        if !rest.is_empty() {
            let parts: Vec<&str> = rest.split('/').collect();
            let last = parts.len() - 1;

            for (index, part) in parts.into_iter().enumerate() {
                if part.is_empty() {
                    return Err(PatternError::EmptySegment(source.to_string()));
                }
                if part == "**" {
                    if index != last {
                        return Err(PatternError::MisplacedDoubleWildcard(source.to_string()));
                    }
                    trailing_wildcard = true;
                    continue;
                }
                segments.push(parse_segment(source, part, &mut variables)?);
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
            trailing_wildcard,
        })
    }

    /// Returns true if the request path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let mut parts = split_path(path);
        for segment in &self.segments {
            match parts.next() {
                Some(part) if segment.accepts(part) => {}
                _ => return false,
            }
        }
        self.trailing_wildcard || parts.next().is_none()
    }

    /// True for the unconstrained pattern `/**`.
    pub fn is_catch_all(&self) -> bool {
        self.segments.is_empty() && self.trailing_wildcard
    }

    /// Returns true if every path matched by `other` is also matched by `self`.
    ///
    /// Conservative: a `false` answer does not prove the patterns are disjoint.
    pub fn covers(&self, other: &PathPattern) -> bool {
        if self.segments.len() > other.segments.len() {
            return false;
        }
        if !self.trailing_wildcard
            && (other.trailing_wildcard || other.segments.len() != self.segments.len())
        {
            return false;
        }
        self.segments
            .iter()
            .zip(&other.segments)
            .all(|(mine, theirs)| match (mine, theirs) {
                (Segment::Literal(a), Segment::Literal(b)) => a == b,
                (Segment::Literal(_), _) => false,
                _ => true,
            })
    }

    /// The pattern as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segment(
    pattern: &str,
    part: &str,
    variables: &mut HashSet<String>,
) -> Result<Segment, PatternError> {
    if part == "*" {
        return Ok(Segment::Any);
    }

    if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
        let valid = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PatternError::InvalidSegment {
                pattern: pattern.to_string(),
                segment: part.to_string(),
            });
        }
        if !variables.insert(name.to_string()) {
            return Err(PatternError::DuplicateVariable {
                pattern: pattern.to_string(),
                name: name.to_string(),
            });
        }
        return Ok(Segment::Variable(name.to_string()));
    }

    if part.contains(['*', '{', '}']) {
        return Err(PatternError::InvalidSegment {
            pattern: pattern.to_string(),
            segment: part.to_string(),
        });
    }

    Ok(Segment::Literal(part.to_string()))
}

/// Split a request path into segments, ignoring the leading and a single trailing slash.
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    (!trimmed.is_empty())
        .then(|| trimmed.split('/'))
        .into_iter()
        .flatten()
}
