//! Where a token sits in the script.

use std::fmt;

/// Start of a token plus its length.
///
/// Only the line ends up in programs and in the last-error query. Column
/// and length are used to underline the token when a diagnostic is shown
/// with its source line.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// 1-based.
    pub line: u32,
    /// 1-based, counted in bytes.
    pub col: u32,
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// An empty span, used for positions such as end of input.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, 0)
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
    fn renders_line_and_column() {
        let span = Span::new(3, 15, 5);
        assert_eq!(span.to_string(), "3:15");
        assert_eq!(format!("{span:?}"), "3:15");
        assert_eq!(Span::point(7, 1).len, 0);
    }
}
