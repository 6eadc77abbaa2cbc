//! Cadl compiler core types.
//!
//! Shared vocabulary for every phase of a compilation:
//!
//! - [`Span`] and [`SourceFileId`] locate nodes in source text
//! - [`Diagnostic`] and [`DiagnosticCollector`] carry recoverable findings
//! - [`CompileError`], [`HostError`] and [`OptionsError`] are the typed failures
//! - [`CompilerOptions`] is the configuration value consumed by the driver
//! - [`CompilerHost`] is the capability set through which the core touches the outside world

pub mod diagnostics;
pub mod error;
pub mod host;
pub mod ids;
pub mod options;
pub mod span;

pub use diagnostics::{
    Diagnosed, Diagnostic, DiagnosticCode, DiagnosticCollector, Location, Severity,
};
pub use error::{CompileError, HostError, InternalError, OptionsError};
pub use host::{CompilerHost, LogLevel, LogLine};
pub use ids::SourceFileId;
pub use options::{
    CompilerOptions, EmitterOptions, OptionOverrides, parse_option_overrides, resolve_emitters,
};
pub use span::Span;
