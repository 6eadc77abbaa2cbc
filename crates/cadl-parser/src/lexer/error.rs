//! Lexer errors.

use cadl_core::{Diagnostic, DiagnosticCode, Span};
use thiserror::Error;

/// Errors that occur during tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Invalid character '{ch}'.")]
    InvalidCharacter { ch: char, span: Span },

    #[error("Unterminated string literal.")]
    UnterminatedString { span: Span },

    #[error("Unterminated comment.")]
    UnterminatedComment { span: Span },

    #[error("Invalid number literal '{text}'.")]
    InvalidNumber { text: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::InvalidCharacter { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }

    pub fn code(&self) -> DiagnosticCode {
        match self {
            LexError::InvalidCharacter { .. } => DiagnosticCode::InvalidCharacter,
            LexError::UnterminatedString { .. } => DiagnosticCode::UnterminatedString,
            LexError::UnterminatedComment { .. } => DiagnosticCode::UnterminatedComment,
            LexError::InvalidNumber { .. } => DiagnosticCode::InvalidNumber,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code(), self.to_string())
    }
}
