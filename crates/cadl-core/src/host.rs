//! Host capabilities consumed by the compiler.
//!
//! The core never calls filesystem APIs itself. A production driver supplies a
//! host backed by the real filesystem; tests supply an in-memory one.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::HostError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// One line sent to the host's log sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    /// Trace area (`"load"`, `"bind"`, `"check"`) for trace lines.
    pub area: Option<&'static str>,
    pub message: String,
}

impl LogLine {
    pub fn trace(area: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Trace,
            area: Some(area),
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            area: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.area {
            Some(area) => write!(f, "{} [{}] {}", self.level, area, self.message),
            None => write!(f, "{} {}", self.level, self.message),
        }
    }
}

/// The capability set a compilation runs against.
pub trait CompilerHost {
    /// Read a source file.
    fn read_file(&self, path: &Path) -> Result<String, HostError>;

    /// Write an output file. Used by emitters, never by the core itself.
    fn write_file(&self, path: &Path, contents: &str) -> Result<(), HostError>;

    /// Emit a log line.
    fn log(&self, line: LogLine);

    /// Resolve an `import` specifier written in `importing_file`.
    ///
    /// Relative specifiers are resolved against the importing file's directory.
    fn resolve_import(&self, importing_file: &Path, specifier: &str) -> PathBuf {
        let specifier = Path::new(specifier);
        if specifier.is_absolute() {
            return normalize(specifier);
        }
        let base = importing_file.parent().unwrap_or_else(|| Path::new(""));
        normalize(&base.join(specifier))
    }
}

/// Lexically collapse `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
