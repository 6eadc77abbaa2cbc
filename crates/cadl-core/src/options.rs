//! Compiler configuration.
//!
//! [`CompilerOptions`] is a plain value: loading it from a config file or the
//! command line happens outside the core. The helpers here cover the part of
//! that translation that has compiler semantics: splitting `key=value`
//! overrides into free-form and per-emitter bags, and layering them over the
//! configured emitters.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::OptionsError;

/// Option bag for one emitter (or the free-form misc bag).
pub type EmitterOptions = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Where emitters write. Unused by the core.
    pub output_dir: Option<PathBuf>,
    /// Skip loading the standard library.
    pub nostdlib: bool,
    /// Drive the recompile loop on file changes.
    pub watch_for_changes: bool,
    /// Informs drivers that emitters should not run. Checking is unaffected.
    pub no_emit: bool,
    /// Free-form values readable by decorators and emitters.
    pub misc_options: EmitterOptions,
    /// Files loaded before the entry file.
    pub additional_imports: Vec<PathBuf>,
    /// Warnings make the compilation fail for the caller.
    pub warning_as_error: bool,
    /// Enabled trace areas (`"load"`, `"bind"`, `"check"`, or `"*"`).
    pub trace: Vec<String>,
    /// Emitter name to its option bag.
    pub emitters: BTreeMap<String, EmitterOptions>,
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nostdlib(mut self, value: bool) -> Self {
        self.nostdlib = value;
        self
    }

    pub fn warning_as_error(mut self, value: bool) -> Self {
        self.warning_as_error = value;
        self
    }

    pub fn with_import(mut self, path: impl Into<PathBuf>) -> Self {
        self.additional_imports.push(path.into());
        self
    }

    pub fn with_trace(mut self, area: impl Into<String>) -> Self {
        self.trace.push(area.into());
        self
    }

    pub fn with_misc_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.misc_options.insert(key.into(), value.into());
        self
    }

    pub fn is_tracing(&self, area: &str) -> bool {
        self.trace.iter().any(|t| t == "*" || t == area)
    }

    pub fn misc_option(&self, key: &str) -> Option<&str> {
        self.misc_options.get(key).map(String::as_str)
    }
}

/// Overrides split out of `key=value` / `emitter.key=value` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub misc_options: EmitterOptions,
    pub emitters: BTreeMap<String, EmitterOptions>,
}

/// Split override strings into the misc bag and per-emitter bags.
///
/// `key=value` goes to the misc bag, `emitter.key=value` to that emitter's bag.
/// Anything else is rejected.
pub fn parse_option_overrides<S: AsRef<str>>(
    options: &[S],
) -> Result<OptionOverrides, OptionsError> {
    let mut overrides = OptionOverrides::default();

    for option in options {
        let option = option.as_ref();
        let Some((key, value)) = option.split_once('=') else {
            return Err(OptionsError::InvalidOption(option.to_string()));
        };
        if value.contains('=') {
            return Err(OptionsError::InvalidOption(option.to_string()));
        }

        let key_parts: Vec<&str> = key.split('.').collect();
        if key_parts.iter().any(|part| part.is_empty()) {
            return Err(OptionsError::EmptyKey(option.to_string()));
        }

        match key_parts.as_slice() {
            [key] => {
                overrides
                    .misc_options
                    .insert(key.to_string(), value.to_string());
            }
            [emitter, key] => {
                overrides
                    .emitters
                    .entry(emitter.to_string())
                    .or_default()
                    .insert(key.to_string(), value.to_string());
            }
            _ => return Err(OptionsError::InvalidOption(option.to_string())),
        }
    }

    Ok(overrides)
}

/// Pick the emitters to run and layer overrides over their configured options.
///
/// With `selected == None` every configured emitter runs. A selected emitter
/// with no configuration starts from an empty bag.
pub fn resolve_emitters(
    configured: &BTreeMap<String, EmitterOptions>,
    selected: Option<&[String]>,
    overrides: &OptionOverrides,
) -> BTreeMap<String, EmitterOptions> {
    let emitters: BTreeMap<String, EmitterOptions> = match selected {
        Some(names) => names
            .iter()
            .map(|name| (name.clone(), configured.get(name).cloned().unwrap_or_default()))
            .collect(),
        None => configured.clone(),
    };

    emitters
        .into_iter()
        .map(|(name, mut options)| {
            if let Some(extra) = overrides.emitters.get(&name) {
                options.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            (name, options)
        })
        .collect()
}
