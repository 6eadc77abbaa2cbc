//! Lexical analysis for Cadl source text.

mod cursor;
mod error;
mod lexer;
mod token;

pub use error::LexError;
pub use lexer::Lexer;
pub use token::{Token, TokenKind, lookup_keyword};
