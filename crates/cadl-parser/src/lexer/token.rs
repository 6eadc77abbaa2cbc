//! Token types for the Cadl lexer.

use cadl_core::Span;
use std::fmt;

/// A token borrowed from the source text.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// The source text of this token.
    pub lexeme: &'src str,
    pub span: Span,
}

impl<'src> Token<'src> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'src str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Identifier,
    StringLiteral,
    NumberLiteral,

    // Keywords
    Import,
    Using,
    Namespace,
    Model,
    Op,
    Interface,
    Extends,
    Is,
    True,
    False,
    Void,
    Never,

    // Punctuation
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    LessThan,
    GreaterThan,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Ellipsis,
    Question,
    At,
    Bar,
    Equals,

    /// Placeholder emitted after a lexical error.
    Invalid,
    Eof,
}

impl TokenKind {
    /// Text used in "expected X" messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::StringLiteral => "string literal",
            TokenKind::NumberLiteral => "number literal",
            TokenKind::Import => "'import'",
            TokenKind::Using => "'using'",
            TokenKind::Namespace => "'namespace'",
            TokenKind::Model => "'model'",
            TokenKind::Op => "'op'",
            TokenKind::Interface => "'interface'",
            TokenKind::Extends => "'extends'",
            TokenKind::Is => "'is'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Void => "'void'",
            TokenKind::Never => "'never'",
            TokenKind::OpenBrace => "'{'",
            TokenKind::CloseBrace => "'}'",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::OpenBracket => "'['",
            TokenKind::CloseBracket => "']'",
            TokenKind::LessThan => "'<'",
            TokenKind::GreaterThan => "'>'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::Question => "'?'",
            TokenKind::At => "'@'",
            TokenKind::Bar => "'|'",
            TokenKind::Equals => "'='",
            TokenKind::Invalid => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }

    /// Keywords that may still be used as identifiers (property names, decorator names).
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Import
                | TokenKind::Using
                | TokenKind::Namespace
                | TokenKind::Model
                | TokenKind::Op
                | TokenKind::Interface
                | TokenKind::Extends
                | TokenKind::Is
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Void
                | TokenKind::Never
        )
    }
}

/// Map an identifier to its keyword kind, if it is one.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "import" => TokenKind::Import,
        "using" => TokenKind::Using,
        "namespace" => TokenKind::Namespace,
        "model" => TokenKind::Model,
        "op" => TokenKind::Op,
        "interface" => TokenKind::Interface,
        "extends" => TokenKind::Extends,
        "is" => TokenKind::Is,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "void" => TokenKind::Void,
        "never" => TokenKind::Never,
        _ => return None,
    };
    Some(kind)
}
