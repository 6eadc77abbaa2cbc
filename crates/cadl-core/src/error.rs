//! Typed failures of the compiler core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! CompileError  - fatal, aborts one compilation (missing or unreadable source)
//! HostError     - a host capability failed (read, write)
//! OptionsError  - malformed option override strings
//! InternalError - a defect in the compiler, kept apart from diagnostics
//! ```
//!
//! Everything a user can cause by writing bad source is a
//! [`Diagnostic`](crate::Diagnostic), never one of these.

use std::path::PathBuf;

use thiserror::Error;

/// A broken compiler invariant, with the context chain that led to it.
pub type InternalError = anyhow::Error;

/// Failures reported by a [`CompilerHost`](crate::CompilerHost).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
}

impl HostError {
    pub fn path(&self) -> &PathBuf {
        match self {
            HostError::NotFound { path } => path,
            HostError::Read { path, .. } => path,
            HostError::Write { path, .. } => path,
        }
    }
}

/// Fatal errors: the compilation cannot produce a program at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A source file named by the entry point or an import does not exist.
    #[error("source file not found: {}", path.display())]
    SourceNotFound {
        path: PathBuf,
        /// The file whose `import` named it, if any.
        imported_from: Option<PathBuf>,
    },

    /// A source file exists but could not be read.
    #[error("cannot read source file {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: HostError,
    },
}

impl CompileError {
    /// Classify a host read failure for `path`.
    pub fn from_host(path: PathBuf, imported_from: Option<PathBuf>, error: HostError) -> Self {
        match error {
            HostError::NotFound { .. } => CompileError::SourceNotFound {
                path,
                imported_from,
            },
            other => CompileError::SourceUnreadable {
                path,
                source: other,
            },
        }
    }
}

/// Malformed `--option` style overrides.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("option value \"{0}\" must be in the format: <emitterName>.some-option=value")]
    InvalidOption(String),

    #[error("option value \"{0}\" has an empty key")]
    EmptyKey(String),
}
