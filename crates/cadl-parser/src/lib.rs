//! Cadl lexer and parser.
//!
//! Turns source text into an owned [`ast::Script`]. Parsing never fails: syntax
//! errors come back as diagnostics next to whatever could be recovered.
//!
//! # Example
//!
//! ```
//! use cadl_core::SourceFileId;
//!
//! let (script, diagnostics) = cadl_parser::parse("model Pet { name: string; }", SourceFileId::new(1));
//! assert!(diagnostics.is_empty());
//! assert_eq!(script.items().len(), 1);
//! ```

pub mod ast;
pub mod lexer;

use cadl_core::{Diagnosed, SourceFileId};

pub use ast::{Parser, Script};

/// Parse one source file.
pub fn parse(source: &str, file: SourceFileId) -> Diagnosed<Script> {
    Parser::parse(source, file)
}
