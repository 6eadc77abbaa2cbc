//! Diagnostics produced while parsing, binding and checking.
//!
//! Every expected failure in a compilation is reported as a [`Diagnostic`]
//! rather than an `Err`. Producers accumulate them in a [`DiagnosticCollector`],
//! or hand back a [`Diagnosed`] pair that the caller folds into its own collector
//! with [`DiagnosticCollector::pipe`].
//!
//! # Examples
//!
//! ```
//! use cadl_core::{Diagnostic, DiagnosticCode, DiagnosticCollector};
//!
//! fn half(n: u32) -> (u32, Vec<Diagnostic>) {
//!     let mut diagnostics = DiagnosticCollector::new();
//!     if n % 2 == 1 {
//!         diagnostics.add(Diagnostic::new(DiagnosticCode::InvalidArgument, "odd input"));
//!     }
//!     diagnostics.wrap(n / 2)
//! }
//!
//! let mut all = DiagnosticCollector::new();
//! let value = all.pipe(half(7));
//! assert_eq!(value, 3);
//! assert_eq!(all.len(), 1);
//! ```

use std::fmt;

use crate::{SourceFileId, Span};

/// A value together with the diagnostics produced while computing it.
pub type Diagnosed<T> = (T, Vec<Diagnostic>);

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Stable identifier of a diagnostic kind.
///
/// The string form (see [`DiagnosticCode::as_str`]) is what tooling matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Parse
    TokenExpected,
    UnexpectedToken,
    UnterminatedString,
    UnterminatedComment,
    InvalidCharacter,
    InvalidNumber,

    // Bind
    DuplicateSymbol,
    UnknownNamespace,

    // Check
    UnknownIdentifier,
    AmbiguousReference,
    InvalidTypeReference,
    InvalidTemplateArgs,
    CyclicReference,
    DuplicateProperty,
    InvalidSpread,
    InvalidBaseType,
    InvalidOperationReference,
    Deprecated,

    // Decorators
    UnknownDecorator,
    InvalidDecoratorTarget,
    InvalidArgument,
}

impl DiagnosticCode {
    /// Kebab-case code reported to users.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::TokenExpected => "token-expected",
            DiagnosticCode::UnexpectedToken => "unexpected-token",
            DiagnosticCode::UnterminatedString => "unterminated-string",
            DiagnosticCode::UnterminatedComment => "unterminated-comment",
            DiagnosticCode::InvalidCharacter => "invalid-character",
            DiagnosticCode::InvalidNumber => "invalid-number",
            DiagnosticCode::DuplicateSymbol => "duplicate-symbol",
            DiagnosticCode::UnknownNamespace => "unknown-namespace",
            DiagnosticCode::UnknownIdentifier => "unknown-identifier",
            DiagnosticCode::AmbiguousReference => "ambiguous-reference",
            DiagnosticCode::InvalidTypeReference => "invalid-type-reference",
            DiagnosticCode::InvalidTemplateArgs => "invalid-template-args",
            DiagnosticCode::CyclicReference => "cyclic-reference",
            DiagnosticCode::DuplicateProperty => "duplicate-property",
            DiagnosticCode::InvalidSpread => "invalid-spread",
            DiagnosticCode::InvalidBaseType => "invalid-base-type",
            DiagnosticCode::InvalidOperationReference => "invalid-operation-reference",
            DiagnosticCode::Deprecated => "deprecated",
            DiagnosticCode::UnknownDecorator => "unknown-decorator",
            DiagnosticCode::InvalidDecoratorTarget => "invalid-decorator-target",
            DiagnosticCode::InvalidArgument => "invalid-decorator-argument",
        }
    }

    /// Severity used when a producer does not pick one explicitly.
    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticCode::Deprecated => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a diagnostic points: a file and a span inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: SourceFileId,
    pub span: Span,
}

impl Location {
    #[inline]
    pub fn new(file: SourceFileId, span: Span) -> Self {
        Self { file, span }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.span)
    }
}

/// A single finding from parsing, binding or checking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity and no location.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn at_opt(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "{}: {} {}: {}",
                location, self.severity, self.code, self.message
            ),
            None => write!(f, "{} {}: {}", self.severity, self.code, self.message),
        }
    }
}

/// Append-only sink for diagnostics.
///
/// Emission order is preserved; the collector never reorders or drops entries.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Take the value out of a [`Diagnosed`] pair, keeping its diagnostics.
    pub fn pipe<T>(&mut self, (value, diagnostics): Diagnosed<T>) -> T {
        self.diagnostics.extend(diagnostics);
        value
    }

    /// Pair a value with everything collected so far.
    pub fn wrap<T>(self, value: T) -> Diagnosed<T> {
        (value, self.diagnostics)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Whether the collected diagnostics make the compilation fail.
    ///
    /// Warnings only count when `warning_as_error` is set.
    pub fn has_errors(&self, warning_as_error: bool) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.is_error() || (warning_as_error && d.severity == Severity::Warning))
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollector {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
