//! The standard library: built-in scalar models and `Array<T>`.
//!
//! Parsed once per process and shared by every compilation.

use std::sync::Arc;

use cadl_core::{Diagnostic, SourceFileId};
use cadl_parser::Script;
use lazy_static::lazy_static;

/// Path reported for stdlib diagnostics and source listings.
pub const STDLIB_PATH: &str = "<stdlib>/lib.cadl";

const SOURCE: &str = include_str!("../lib/lib.cadl");

lazy_static! {
    static ref STDLIB: (Arc<Script>, Vec<Diagnostic>) = {
        let (script, diagnostics) = cadl_parser::parse(SOURCE, SourceFileId::STDLIB);
        (Arc::new(script), diagnostics)
    };
}

pub fn source() -> &'static str {
    SOURCE
}

pub fn script() -> Arc<Script> {
    Arc::clone(&STDLIB.0)
}

/// Parse diagnostics of the stdlib itself. Empty unless the bundled source is broken.
pub fn diagnostics() -> &'static [Diagnostic] {
    &STDLIB.1
}
