//! Filesystem-backed compiler host.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use cadl_core::{CompilerHost, HostError, LogLevel, LogLine};

/// Reads and writes the real filesystem; log lines become `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdHost;

impl StdHost {
    pub fn new() -> Self {
        Self
    }
}

impl CompilerHost for StdHost {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn read_file(&self, path: &Path) -> Result<String, HostError> {
        fs::read_to_string(path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => HostError::NotFound {
                path: path.to_path_buf(),
            },
            _ => HostError::Read {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
        })
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), HostError> {
        let write_error = |error: std::io::Error| HostError::Write {
            path: path.to_path_buf(),
            message: error.to_string(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, contents).map_err(write_error)
    }

    fn log(&self, line: LogLine) {
        let area = line.area.unwrap_or("cadl");
        match line.level {
            LogLevel::Trace => tracing::trace!(area, "{}", line.message),
            LogLevel::Debug => tracing::debug!(area, "{}", line.message),
            LogLevel::Info => tracing::info!(area, "{}", line.message),
            LogLevel::Warning => tracing::warn!(area, "{}", line.message),
            LogLevel::Error => tracing::error!(area, "{}", line.message),
        }
    }
}
