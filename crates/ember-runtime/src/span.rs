//! Source locations

use serde::{Deserialize, Serialize};

/// Byte range in a source file plus the 1-based line it starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Line of `start` (1-based)
    pub line: u32,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, line: u32) -> Self {
        Self { start, end, line }
    }

    /// Placeholder span for synthesized nodes
    pub fn dummy() -> Self {
        Self::default()
    }

    /// Span covering both `self` and `other`; keeps the earlier line
    pub fn merge(self, other: Span) -> Span {
        let (line, start) = if other.start < self.start {
            (other.line, other.start)
        } else {
            (self.line, self.start)
        };
        Span {
            start,
            end: self.end.max(other.end),
            line,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
