//! Source locations.
//!
//! The binder never sees source text. Spans come from the parsing layer with
//! every declaration tree node and end up unchanged in the diagnostics.

use std::fmt;

/// Where a node starts, and how many bytes it covers.
///
/// Line 0 is reserved for nodes without a source location, such as the
/// built-in `dotlin.lang` functions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// 1-based line.
    pub line: u32,
    /// 1-based byte column.
    pub col: u32,
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Whether the node has no source location.
    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.line == 0
    }

    /// `(line, col)`, for ordering findings by where they start.
    #[inline]
    pub fn position(&self) -> (u32, u32) {
        (self.line, self.col)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line, self.col, self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            f.write_str("<builtin>")
        } else {
            write!(f, "{}:{}", self.line, self.col)
        }
    }
}
