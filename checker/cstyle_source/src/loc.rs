//! Line/column positions and inclusive spans.
//!
//! All positions are zero-based. Columns index the tab-expanded form of a
//! line (see [`SourceFile`](crate::SourceFile)); diagnostics convert to
//! 1-based line numbers only at the output boundary.

use std::fmt;

/// A position in the source: zero-based line and column.
///
/// Ordering is lexicographic (line first, then column), which makes
/// containment tests over multi-line spans plain comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Loc {
    pub line: u32,
    pub col: u32,
}

impl Loc {
    /// Create a location from line and column indices.
    pub fn new(line: u32, col: u32) -> Self {
        Loc { line, col }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// An inclusive range of source positions.
///
/// Both endpoints are part of the span: the span of a block comment starts
/// at the `/` of `/*` and ends at the `/` of `*/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Loc,
    pub end: Loc,
}

impl Span {
    /// Create a span from its inclusive endpoints.
    pub fn new(start: Loc, end: Loc) -> Self {
        debug_assert!(start <= end, "span start {start} exceeds end {end}");
        Span { start, end }
    }

    /// Returns `true` if `loc` falls anywhere in the span, endpoints included.
    pub fn contains(&self, loc: Loc) -> bool {
        self.start <= loc && loc <= self.end
    }

    /// Returns `true` if `loc` falls strictly between the endpoints.
    ///
    /// Used for "inside the delimiters" queries where the delimiter
    /// characters themselves do not count as interior.
    pub fn contains_interior(&self, loc: Loc) -> bool {
        self.start < loc && loc < self.end
    }

    /// Returns `true` if the span begins and ends on one line.
    pub fn single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ordering_is_line_major() {
        assert!(Loc::new(0, 9) < Loc::new(1, 0));
        assert!(Loc::new(2, 3) < Loc::new(2, 4));
        assert_eq!(Loc::new(1, 1), Loc::new(1, 1));
    }

    #[test]
    fn contains_includes_endpoints() {
        let span = Span::new(Loc::new(1, 2), Loc::new(3, 0));
        assert!(span.contains(Loc::new(1, 2)));
        assert!(span.contains(Loc::new(2, 99)));
        assert!(span.contains(Loc::new(3, 0)));
        assert!(!span.contains(Loc::new(3, 1)));
        assert!(!span.contains(Loc::new(1, 1)));
    }

    #[test]
    fn interior_excludes_endpoints() {
        let span = Span::new(Loc::new(0, 0), Loc::new(0, 5));
        assert!(!span.contains_interior(Loc::new(0, 0)));
        assert!(span.contains_interior(Loc::new(0, 3)));
        assert!(!span.contains_interior(Loc::new(0, 5)));
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(Loc::new(0, 0).to_string(), "1:1");
        assert_eq!(
            Span::new(Loc::new(0, 0), Loc::new(1, 4)).to_string(),
            "1:1..2:5"
        );
    }
}
