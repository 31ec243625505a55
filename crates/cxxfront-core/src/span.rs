//! Source positions attached to operands and diagnostics.
//!
//! The parser hands every operand over with a [`Span`]; the semantic core only
//! copies and merges them so that each diagnostic points at the construct that
//! caused it.

use std::fmt;

/// A region of a translation unit, identified by its starting line and column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// A span that carries no position (synthesized nodes).
    #[inline]
    pub fn synthetic() -> Self {
        Self::default()
    }

    /// Whether this span was synthesized rather than read from source.
    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Cover both spans. A synthetic operand never widens a real one.
    pub fn merge(self, other: Span) -> Span {
        if other.is_synthetic() {
            return self;
        }
        if self.is_synthetic() {
            return other;
        }
        let (first, second) = if (other.line, other.col) < (self.line, self.col) {
            (other, self)
        } else {
            (self, other)
        };
        if first.line == second.line {
            let end = (second.col + second.len).max(first.col + first.len);
            Span::new(first.line, first.col, end - first.col)
        } else {
            // Multi-line regions keep the start position; the length is approximate.
            Span::new(first.line, first.col, first.len + second.len)
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            write!(f, "<synthesized>")
        } else {
            write!(f, "{}:{}", self.line, self.col)
        }
    }
}
