//! Hierarchical topics and subscription patterns.
//!
//! Topics are dot-delimited ASCII tokens (`structs.grid.capacity`). A pattern
//! is a topic that may end in the multi-level wildcard `>`, which accepts one
//! or more trailing segments, following broker semantics. The single-level
//! wildcard `*` is not part of the pattern language and is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between topic segments.
pub const TOPIC_SEGMENT_SEPARATOR: char = '.';

/// Trailing multi-level wildcard token.
pub const WILDCARD_MULTI: &str = ">";

/// Single-level wildcard token. Recognised only so it can be rejected.
pub const WILDCARD_SINGLE: &str = "*";

/// Upper bound on a pattern's length in bytes.
pub const MAX_PATTERN_LENGTH: usize = 256;

/// Errors produced while validating a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("pattern exceeds {MAX_PATTERN_LENGTH} bytes")]
    TooLong,
    #[error("pattern contains an empty segment at position {0}")]
    EmptySegment(usize),
    #[error("pattern segment {0:?} contains whitespace or non-ascii characters")]
    InvalidCharacter(String),
    #[error("wildcard `>` is only allowed as the last segment")]
    MisplacedWildcard,
    #[error("single-level wildcard `*` is not supported")]
    SingleLevelWildcard,
}

/// A validated subscription pattern.
///
/// Stored as its canonical string so it can be persisted, hashed and sent to
/// the broker without re-rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicPattern(String);

impl TopicPattern {
    /// Validate and build a pattern.
    pub fn new(raw: impl Into<String>) -> Result<Self, PatternError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        if raw.len() > MAX_PATTERN_LENGTH {
            return Err(PatternError::TooLong);
        }

        let segments: Vec<&str> = raw.split(TOPIC_SEGMENT_SEPARATOR).collect();
        let last = segments.len() - 1;
        for (index, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(PatternError::EmptySegment(index));
            }
            if *segment == WILDCARD_SINGLE {
                return Err(PatternError::SingleLevelWildcard);
            }
            if *segment == WILDCARD_MULTI {
                if index != last {
                    return Err(PatternError::MisplacedWildcard);
                }
                continue;
            }
            if !segment.chars().all(|c| c.is_ascii_graphic()) {
                return Err(PatternError::InvalidCharacter((*segment).to_owned()));
            }
            if segment.contains(WILDCARD_MULTI) || segment.contains(WILDCARD_SINGLE) {
                return Err(PatternError::InvalidCharacter((*segment).to_owned()));
            }
        }

        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the pattern ends in the multi-level wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD_MULTI || self.0.ends_with(".>")
    }

    /// Segments before the trailing wildcard (all segments if there is none).
    pub fn fixed_segments(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(TOPIC_SEGMENT_SEPARATOR)
            .filter(|segment| *segment != WILDCARD_MULTI)
    }

    /// Whether a concrete topic would be delivered to this pattern.
    ///
    /// Segment comparison is exact and case-sensitive. A trailing `>` needs at
    /// least one segment to absorb.
    pub fn matches(&self, topic: &str) -> bool {
        let mut topic_segments = topic.split(TOPIC_SEGMENT_SEPARATOR);
        for fixed in self.fixed_segments() {
            match topic_segments.next() {
                Some(segment) if segment == fixed => {}
                _ => return false,
            }
        }

        let remaining = topic_segments.filter(|s| !s.is_empty()).count();
        if self.is_wildcard() {
            remaining >= 1
        } else {
            remaining == 0
        }
    }
}

impl fmt::Display for TopicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TopicPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TopicPattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TopicPattern> for String {
    fn from(value: TopicPattern) -> Self {
        value.0
    }
}

impl AsRef<str> for TopicPattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Segment of `topic` that follows the namespace prefix.
///
/// Falls back to the first segment when the topic lives outside the
/// namespace.
pub fn domain_segment<'a>(topic: &'a str, namespace: &str) -> &'a str {
    let rest = topic
        .strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix(TOPIC_SEGMENT_SEPARATOR))
        .unwrap_or(topic);
    rest.split(TOPIC_SEGMENT_SEPARATOR).next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(raw: &str) -> TopicPattern {
        TopicPattern::new(raw).unwrap()
    }

    #[test]
    fn test_wildcard_matches_any_depth_under_prefix() {
        let p = pattern("ns.grid.>");
        assert!(p.matches("ns.grid.capacity"));
        assert!(p.matches("ns.grid.1-42.capacity"));
        assert!(p.matches("ns.grid.a.b.c.d.e"));
        assert!(!p.matches("ns.grid"));
        assert!(!p.matches("ns.guild.capacity"));
        assert!(!p.matches("other.grid.capacity"));
    }

    #[test]
    fn test_exact_pattern_requires_identical_segments() {
        let p = pattern("ns.grid.capacity");
        assert!(p.matches("ns.grid.capacity"));
        assert!(!p.matches("ns.grid.capacity.extra"));
        assert!(!p.matches("ns.grid"));
        assert!(!p.matches("ns.Grid.capacity"));
    }

    #[test]
    fn test_bare_wildcard_matches_everything() {
        let p = pattern(">");
        assert!(p.is_wildcard());
        assert!(p.matches("a"));
        assert!(p.matches("a.b.c"));
    }

    #[test]
    fn test_rejects_invalid_patterns() {
        assert_eq!(TopicPattern::new(""), Err(PatternError::Empty));
        assert_eq!(
            TopicPattern::new("ns..grid"),
            Err(PatternError::EmptySegment(1))
        );
        assert_eq!(
            TopicPattern::new("ns.>.grid"),
            Err(PatternError::MisplacedWildcard)
        );
        assert_eq!(
            TopicPattern::new("ns.*.grid"),
            Err(PatternError::SingleLevelWildcard)
        );
        assert!(matches!(
            TopicPattern::new("ns.gr id"),
            Err(PatternError::InvalidCharacter(_))
        ));
        assert!(matches!(
            TopicPattern::new("ns.grid>"),
            Err(PatternError::InvalidCharacter(_))
        ));
        assert_eq!(
            TopicPattern::new("a".repeat(MAX_PATTERN_LENGTH + 1)),
            Err(PatternError::TooLong)
        );
    }

    #[test]
    fn test_pattern_serde_validates() {
        let ok: TopicPattern = serde_json::from_str("\"ns.guild.>\"").unwrap();
        assert_eq!(ok.as_str(), "ns.guild.>");
        assert!(serde_json::from_str::<TopicPattern>("\"ns.*\"").is_err());
    }

    #[test]
    fn test_domain_segment() {
        assert_eq!(domain_segment("structs.grid.capacity", "structs"), "grid");
        assert_eq!(domain_segment("structs.guild", "structs"), "guild");
        assert_eq!(domain_segment("consensus.block", "structs"), "consensus");
        assert_eq!(domain_segment("structsx.grid", "structs"), "structsx");
    }
}
