//! Source positions and ranges.
//!
//! These types are used by tokens, AST nodes and errors to track where
//! things originate in the source text.

use serde::{Serialize, Serializer};
use std::fmt;

/// A byte range in source text: start inclusive, end exclusive.
///
/// Serializes as a two-element array `[start, end]`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create an empty range at a position.
    #[inline]
    pub fn empty(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// The length of this range in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether this range is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether this range fully contains another range.
    #[inline]
    pub fn contains_range(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Serialize for TextRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.start, self.end).serialize(serializer)
    }
}

/// A line/column position. Lines are 1-based, columns 0-based, matching
/// the positions Lua itself reports in error messages.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[inline]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A start/end pair of positions attached to AST nodes when location
/// tracking is enabled.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_range() {
        let range = TextRange::new(5, 15);
        assert_eq!(range.len(), 10);
        assert!(!range.is_empty());
        assert!(range.contains_range(&TextRange::new(6, 15)));
        assert!(!range.contains_range(&TextRange::new(4, 10)));
    }

    #[test]
    fn test_range_serializes_as_pair() {
        let range = TextRange::new(3, 9);
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "[3,9]");
    }
}
