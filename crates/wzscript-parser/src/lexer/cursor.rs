//! Character-level reading of the source.

/// Reads script text one character at a time, keeping line and column
/// current for the spans of the tokens built from it.
pub struct Cursor<'src> {
    source: &'src str,
    /// Byte position of the next character.
    pos: usize,
    line: u32,
    column: u32,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    #[inline]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Byte offset of the next character.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.pos as u32
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    #[inline]
    fn rest(&self) -> &'src str {
        self.source.get(self.pos..).unwrap_or("")
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The character after [`peek`](Self::peek), for two-character
    /// operators and comment openers.
    #[inline]
    pub fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += ch.len_utf8() as u32;
        }
        Some(ch)
    }

    /// Take `ch` if it is next.
    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        let found = self.peek() == Some(ch);
        if found {
            self.advance();
        }
        found
    }

    /// Take characters while `accept` holds and return them.
    pub fn eat_while(&mut self, accept: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset();
        while self.peek().is_some_and(&accept) {
            self.advance();
        }
        self.slice_from(start)
    }

    /// Text between byte offset `start` and the cursor.
    #[inline]
    pub fn slice_from(&self, start: u32) -> &'src str {
        self.source.get(start as usize..self.pos).unwrap_or("")
    }
}

/// Letters and `_` start a word.
#[inline]
pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

/// Words continue with letters, digits and `_`.
#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_characters_in_order() {
        let mut cursor = Cursor::new("wait");
        assert_eq!(cursor.peek(), Some('w'));
        assert_eq!(cursor.peek_second(), Some('a'));
        assert_eq!(cursor.advance(), Some('w'));
        assert_eq!(cursor.offset(), 1);
        assert_eq!(cursor.column(), 2);
    }

    #[test]
    fn newline_starts_a_line() {
        let mut cursor = Cursor::new("a\nb");
        cursor.advance();
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
        assert!(cursor.eat('b'));
        assert!(cursor.is_eof());
        assert_eq!(cursor.advance(), None);
    }

    #[test]
    fn words() {
        let mut cursor = Cursor::new("event_1(");
        assert_eq!(cursor.eat_while(is_ident_continue), "event_1");
        assert_eq!(cursor.peek(), Some('('));
        assert!(is_ident_start('_'));
        assert!(!is_ident_start('1'));
        assert!(!is_ident_continue('.'));
    }
}
