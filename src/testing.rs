//! In-memory host for tests.
//!
//! Files live in a map under [`TestHost::ROOT`]; relative paths given to
//! [`TestHost::add_file`] and [`TestHost::compile`] are resolved against it.
//! Log lines are captured instead of printed.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use cadl_compiler::{Compiler, Program, TypeId};
use cadl_core::host::normalize;
use cadl_core::{CompileError, CompilerHost, CompilerOptions, Diagnostic, HostError, LogLine};
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestHostError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("compilation produced {} diagnostic(s): {}", .0.len(), first_message(.0))]
    Diagnostics(Vec<Diagnostic>),
}

fn first_message(diagnostics: &[Diagnostic]) -> String {
    diagnostics.first().map(ToString::to_string).unwrap_or_default()
}

#[derive(Debug, Default)]
pub struct TestHost {
    files: RefCell<FxHashMap<PathBuf, String>>,
    logs: RefCell<Vec<LogLine>>,
    options: CompilerOptions,
    compiler: Compiler,
}

impl TestHost {
    /// Directory relative test paths live under.
    pub const ROOT: &'static str = "/test";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.files
            .borrow_mut()
            .insert(self.resolve(path.as_ref()), contents.into());
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files.borrow_mut().remove(&self.resolve(path.as_ref()));
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(&self.resolve(path.as_ref())).cloned()
    }

    /// Absolute in-memory path for `path`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        normalize(&Path::new(Self::ROOT).join(path))
    }

    pub fn logs(&self) -> Vec<LogLine> {
        self.logs.borrow().clone()
    }

    /// Compile `entry`, keeping whatever diagnostics it produces.
    pub fn compile_program(&self, entry: impl AsRef<Path>) -> Result<Program, CompileError> {
        let entry = self.resolve(entry.as_ref());
        self.compiler.compile(entry, self, &self.options)
    }

    /// Compile `entry`, failing if it produces any diagnostic.
    pub fn compile(&self, entry: impl AsRef<Path>) -> Result<Program, TestHostError> {
        let program = self.compile_program(entry)?;
        if !program.diagnostics().is_empty() {
            return Err(TestHostError::Diagnostics(program.diagnostics().to_vec()));
        }
        Ok(program)
    }

    /// Compile `entry` and return the `@test` types with the diagnostics.
    pub fn compile_and_diagnose(
        &self,
        entry: impl AsRef<Path>,
    ) -> Result<(Program, FxHashMap<String, TypeId>, Vec<Diagnostic>), CompileError> {
        let program = self.compile_program(entry)?;
        let tests = program.test_types();
        let diagnostics = program.diagnostics().to_vec();
        Ok((program, tests, diagnostics))
    }
}

impl CompilerHost for TestHost {
    fn read_file(&self, path: &Path) -> Result<String, HostError> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), HostError> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn log(&self, line: LogLine) {
        self.logs.borrow_mut().push(line);
    }
}
