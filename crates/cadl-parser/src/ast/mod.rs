//! Abstract syntax tree for Cadl.
//!
//! - [`decl`]: declarations (namespaces, models, operations, interfaces)
//! - [`types`]: type expressions
//! - [`Parser`]: recovering parser producing a [`Script`] per file

pub mod decl;
mod parser;
pub mod types;

pub use decl::*;
pub use parser::Parser;
pub use types::*;

use cadl_core::{SourceFileId, Span};

/// A name as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// The parsed contents of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub file: SourceFileId,
    pub imports: Vec<ImportDecl>,
    pub items: Vec<Item>,
}

impl Script {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn imports(&self) -> &[ImportDecl] {
        &self.imports
    }
}
