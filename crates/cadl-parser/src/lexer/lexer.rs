//! Lexer for Cadl source text.
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s, dispatching
//! on the first character of each token. Errors are recorded and an
//! [`TokenKind::Invalid`] token is produced so the parser can keep going.

use std::collections::VecDeque;

use cadl_core::Span;

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::error::LexError;
use super::token::{Token, TokenKind, lookup_keyword};

pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    lookahead: VecDeque<Token<'src>>,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            lookahead: VecDeque::with_capacity(4),
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'src> {
        if let Some(token) = self.lookahead.pop_front() {
            return token;
        }
        self.scan_token()
    }

    /// Peek at the nth upcoming token (0 = next).
    pub fn peek_nth(&mut self, n: usize) -> Token<'src> {
        while self.lookahead.len() <= n {
            let token = self.scan_token();
            self.lookahead.push_back(token);
        }
        self.lookahead[n]
    }

    fn scan_token(&mut self) -> Token<'src> {
        self.skip_trivia();

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start = self.cursor.offset();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, "", Span::point(start_line, start_col));
        };

        let kind = match c {
            '"' => return self.scan_string(start_line, start_col, start),
            c if c.is_ascii_digit() => return self.scan_number(start_line, start_col, start),
            '-' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                return self.scan_number(start_line, start_col, start);
            }
            c if is_ident_start(c) => {
                let text = self.cursor.eat_while(is_ident_continue);
                let kind = lookup_keyword(text).unwrap_or(TokenKind::Identifier);
                return self.make_token(kind, start_line, start_col, start);
            }
            '.' if self.cursor.check_str("...") => {
                self.cursor.advance();
                self.cursor.advance();
                TokenKind::Ellipsis
            }
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            '@' => TokenKind::At,
            '|' => TokenKind::Bar,
            '=' => TokenKind::Equals,
            other => {
                self.cursor.advance();
                let span = Span::new(start_line, start_col, other.len_utf8() as u32);
                self.errors.push(LexError::InvalidCharacter { ch: other, span });
                return self.make_token(TokenKind::Invalid, start_line, start_col, start);
            }
        };
        self.cursor.advance();
        self.make_token(kind, start_line, start_col, start)
    }

    /// Skip whitespace, BOM and comments.
    fn skip_trivia(&mut self) {
        loop {
            if self.cursor.check_str("\u{FEFF}") {
                self.cursor.advance();
            }
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.check_str("//") => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                Some('/') if self.cursor.check_str("/*") => {
                    let span = Span::new(self.cursor.line(), self.cursor.column(), 2);
                    self.cursor.advance();
                    self.cursor.advance();
                    let mut closed = false;
                    while !self.cursor.is_eof() {
                        if self.cursor.check_str("*/") {
                            self.cursor.advance();
                            self.cursor.advance();
                            closed = true;
                            break;
                        }
                        self.cursor.advance();
                    }
                    if !closed {
                        self.errors.push(LexError::UnterminatedComment { span });
                    }
                }
                _ => return,
            }
        }
    }

    fn scan_string(&mut self, start_line: u32, start_col: u32, start: u32) -> Token<'src> {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let span = Span::new(start_line, start_col, self.cursor.offset() - start);
                    self.errors.push(LexError::UnterminatedString { span });
                    return self.make_token(TokenKind::StringLiteral, start_line, start_col, start);
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('"') => {
                    self.cursor.advance();
                    return self.make_token(TokenKind::StringLiteral, start_line, start_col, start);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn scan_number(&mut self, start_line: u32, start_col: u32, start: u32) -> Token<'src> {
        self.cursor.eat('-');
        self.cursor.eat_while(|c| c.is_ascii_digit());
        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            self.cursor.advance();
            if !self.cursor.eat('-') {
                self.cursor.eat('+');
            }
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        // A number running straight into identifier characters is one bad literal.
        self.cursor.eat_while(is_ident_continue);

        let token = self.make_token(TokenKind::NumberLiteral, start_line, start_col, start);
        if token.lexeme.parse::<f64>().is_err() {
            self.errors.push(LexError::InvalidNumber {
                text: token.lexeme.to_string(),
                span: token.span,
            });
            return Token::new(TokenKind::Invalid, token.lexeme, token.span);
        }
        token
    }

    fn make_token(&self, kind: TokenKind, start_line: u32, start_col: u32, start: u32) -> Token<'src> {
        let lexeme = self.cursor.slice_from(start);
        Token::new(kind, lexeme, Span::new(start_line, start_col, lexeme.len() as u32))
    }
}
