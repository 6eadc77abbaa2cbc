use std::str::Chars;

/// Character-level reader over one source file.
///
/// Keeps the byte offset and the 1-based line and byte column of the next
/// character, so the lexer can stamp spans without rescanning.
pub struct Cursor<'src> {
    source: &'src str,
    offset: u32,
    line: u32,
    column: u32,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    #[inline]
    fn remaining(&self) -> &'src str {
        &self.source[self.offset as usize..]
    }

    #[inline]
    fn chars(&self) -> Chars<'src> {
        self.remaining().chars()
    }

    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
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
        self.offset as usize >= self.source.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.chars().next()
    }

    /// `n` characters past the next one; `peek_nth(0)` is `peek()`.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars().nth(n)
    }

    #[inline]
    pub fn check_str(&self, prefix: &str) -> bool {
        self.remaining().starts_with(prefix)
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        let width = ch.len_utf8() as u32;
        self.offset += width;
        match ch {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += width,
        }
        Some(ch)
    }

    pub fn eat(&mut self, expected: char) -> bool {
        let matched = self.peek() == Some(expected);
        if matched {
            self.advance();
        }
        matched
    }

    /// Skip every character matching `pred` and return the skipped text.
    pub fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
        self.slice_from(start)
    }

    pub fn slice_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.offset as usize]
    }
}

/// Cadl identifiers follow the JavaScript rules minus escapes.
pub fn is_ident_start(c: char) -> bool {
    matches!(c, '_' | '$') || c.is_alphabetic()
}

pub fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_numeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_resets_the_column() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.advance();
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (1, 3));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
    }

    #[test]
    fn eat_while_returns_the_identifier() {
        let mut cursor = Cursor::new("model Foo");
        assert_eq!(cursor.eat_while(is_ident_continue), "model");
        assert!(cursor.eat(' '));
        assert!(cursor.check_str("Foo"));
    }

    #[test]
    fn columns_count_bytes() {
        let mut cursor = Cursor::new("é1");
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!((cursor.offset(), cursor.column()), (2, 3));
        assert_eq!(cursor.peek(), Some('1'));
        cursor.advance();
        assert!(cursor.is_eof());
    }
}
