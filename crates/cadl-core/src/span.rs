//! Positions in Cadl source text.

use std::fmt;

/// Where a token or declaration starts, and how many bytes it covers.
///
/// Lines and columns count from 1; columns are byte offsets within the line.
/// A span that crosses lines keeps its start and the summed length, which is
/// enough to point an editor at the right place.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub line: u32,
    pub col: u32,
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Zero-width span, used for "expected X here" diagnostics.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, 0)
    }

    /// Column one past the last byte, when the span is on a single line.
    #[inline]
    fn end_col(self) -> u32 {
        self.col + self.len
    }

    /// Smallest span starting at `self` that also covers `other`.
    pub fn merge(self, other: Span) -> Span {
        if self.line != other.line {
            return Span::new(self.line, self.col, self.len + other.len);
        }
        let col = self.col.min(other.col);
        Span::new(self.line, col, self.end_col().max(other.end_col()) - col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_line_and_column() {
        assert_eq!(Span::new(3, 15, 5).to_string(), "3:15");
        assert_eq!(format!("{:?}", Span::point(2, 1)), "2:1");
    }

    #[test]
    fn merge_covers_a_declaration_header() {
        // `model Pet`
        let merged = Span::new(1, 1, 5).merge(Span::new(1, 7, 3));
        assert_eq!(merged, Span::new(1, 1, 9));
    }

    #[test]
    fn merge_with_an_inner_point_is_unchanged() {
        let span = Span::new(1, 5, 10);
        assert_eq!(span.merge(Span::point(1, 8)), span);
    }

    #[test]
    fn merge_across_lines_keeps_the_start() {
        let merged = Span::new(1, 5, 10).merge(Span::new(3, 10, 5));
        assert_eq!(merged, Span::new(1, 5, 15));
    }
}
