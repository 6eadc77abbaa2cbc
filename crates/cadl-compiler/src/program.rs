//! Compilation driver.
//!
//! [`Compiler::compile`] loads every source file through a
//! [`CompilerHost`], binds and checks them, and returns a [`Program`] that owns
//! everything the compilation produced. Nothing is shared between programs
//! except the decorator library and the parsed standard library, both
//! read-only.
//!
//! # Example
//!
//! ```ignore
//! let program = Compiler::new().compile("/proj/main.cadl", &host, &CompilerOptions::default())?;
//! for diagnostic in program.diagnostics() {
//!     eprintln!("{diagnostic}");
//! }
//! ```

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cadl_core::host::normalize;
use cadl_core::{
    CompileError, CompilerHost, CompilerOptions, Diagnostic, DiagnosticCollector, InternalError,
    LogLine, SourceFileId,
};
use cadl_parser::Script;
use cadl_registry::{SymbolId, SymbolTable};
use rustc_hash::{FxHashMap, FxHashSet};
use xxhash_rust::xxh64::xxh64;

use crate::checker::{self, CheckOutput};
use crate::decorators::{DecoratorLibrary, DecoratorTarget, StateMap, keys};
use crate::passes::BindingPass;
use crate::stdlib;
use crate::template::TemplateInstanceCache;
use crate::types::{Type, TypeArena, TypeId};

/// A source file consumed by a compilation.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: SourceFileId,
    pub path: PathBuf,
    /// xxh64 of the file contents.
    pub fingerprint: u64,
    pub script: Arc<Script>,
}

/// Entry point for compilations. Cheap to clone; holds the decorator library.
#[derive(Debug, Clone)]
pub struct Compiler {
    library: Arc<DecoratorLibrary>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// A compiler with the built-in decorators.
    pub fn new() -> Self {
        Self::with_library(DecoratorLibrary::builtin())
    }

    pub fn with_library(library: DecoratorLibrary) -> Self {
        Self {
            library: Arc::new(library),
        }
    }

    pub fn library(&self) -> &DecoratorLibrary {
        &self.library
    }

    /// Compile `entry` and everything it imports.
    ///
    /// # Errors
    ///
    /// Only a missing or unreadable source file fails the compilation. Every
    /// other problem is a diagnostic on the returned [`Program`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(
        &self,
        entry: impl AsRef<Path>,
        host: &dyn CompilerHost,
        options: &CompilerOptions,
    ) -> Result<Program, CompileError> {
        let mut diagnostics = DiagnosticCollector::new();

        let source_files = load_sources(entry.as_ref(), host, options, &mut diagnostics)?;

        let mut symbols = SymbolTable::new();
        let binding = {
            let mut pass = BindingPass::new(&mut symbols);
            pass.bind_library(&self.library);
            for file in &source_files {
                pass.bind_script(&file.script);
            }
            pass.finish()
        };
        if options.is_tracing("bind") {
            host.log(LogLine::trace(
                "bind",
                format!(
                    "Bound {} file(s): {} symbol(s), {} namespace merge(s)",
                    binding.files_bound, binding.symbols_declared, binding.namespaces_merged
                ),
            ));
        }
        diagnostics.extend(binding.diagnostics);

        let checked = checker::check(&symbols, &self.library, options);
        if options.is_tracing("check") {
            host.log(LogLine::trace(
                "check",
                format!(
                    "Checked {} type(s), {} template instance(s)",
                    checked.types.len(),
                    checked.instances.len()
                ),
            ));
        }
        let CheckOutput {
            types,
            state,
            symbol_types,
            instances,
            diagnostics: check_diagnostics,
            internal_errors,
        } = checked;
        diagnostics.extend(check_diagnostics);

        tracing::debug!(
            files = source_files.len(),
            diagnostics = diagnostics.len(),
            internal_errors = internal_errors.len(),
            "compilation finished"
        );

        Ok(Program {
            options: options.clone(),
            source_files,
            symbols,
            types,
            state,
            symbol_types,
            instances,
            diagnostics: diagnostics.into_vec(),
            internal_errors,
        })
    }
}

/// Load order: stdlib, additional imports, the entry file, then imports in
/// discovery order. Each path is loaded once.
fn load_sources(
    entry: &Path,
    host: &dyn CompilerHost,
    options: &CompilerOptions,
    diagnostics: &mut DiagnosticCollector,
) -> Result<Vec<SourceFile>, CompileError> {
    let mut files = Vec::new();

    if !options.nostdlib {
        diagnostics.extend(stdlib::diagnostics().iter().cloned());
        files.push(SourceFile {
            id: SourceFileId::STDLIB,
            path: PathBuf::from(stdlib::STDLIB_PATH),
            fingerprint: xxh64(stdlib::source().as_bytes(), 0),
            script: stdlib::script(),
        });
    }

    let mut queue: VecDeque<(PathBuf, Option<PathBuf>)> = options
        .additional_imports
        .iter()
        .map(|path| (normalize(path), None))
        .collect();
    queue.push_back((normalize(entry), None));

    let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
    let mut next_id = 1;

    while let Some((path, imported_from)) = queue.pop_front() {
        if !seen.insert(path.clone()) {
            continue;
        }

        let contents = host
            .read_file(&path)
            .map_err(|error| CompileError::from_host(path.clone(), imported_from.clone(), error))?;

        let id = SourceFileId::new(next_id);
        next_id += 1;
        let script = diagnostics.pipe(cadl_parser::parse(&contents, id));

        if options.is_tracing("load") {
            host.log(LogLine::trace(
                "load",
                format!("Loaded {} ({} bytes)", path.display(), contents.len()),
            ));
        }
        tracing::trace!(path = %path.display(), ?id, "loaded source file");

        for import in script.imports() {
            let resolved = host.resolve_import(&path, &import.path);
            queue.push_back((resolved, Some(path.clone())));
        }

        files.push(SourceFile {
            id,
            fingerprint: xxh64(contents.as_bytes(), 0),
            path,
            script: Arc::new(script),
        });
    }

    Ok(files)
}

/// The result of one compilation.
#[derive(Debug)]
pub struct Program {
    options: CompilerOptions,
    source_files: Vec<SourceFile>,
    symbols: SymbolTable,
    types: TypeArena,
    state: StateMap,
    symbol_types: FxHashMap<SymbolId, TypeId>,
    instances: TemplateInstanceCache,
    diagnostics: Vec<Diagnostic>,
    internal_errors: Vec<InternalError>,
}

impl Program {
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Parse, bind and check diagnostics, in that order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether the caller should treat the compilation as failed.
    pub fn has_errors(&self) -> bool {
        let warning_as_error = self.options.warning_as_error;
        self.diagnostics.iter().any(|d| {
            d.is_error() || (warning_as_error && d.severity == cadl_core::Severity::Warning)
        })
    }

    /// Compiler defects. Empty in a healthy compiler.
    pub fn internal_errors(&self) -> &[InternalError] {
        &self.internal_errors
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    pub fn source_file(&self, id: SourceFileId) -> Option<&SourceFile> {
        self.source_files.iter().find(|file| file.id == id)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn global_namespace(&self) -> SymbolId {
        self.symbols.global_namespace()
    }

    /// Reachable members of a namespace or interface symbol, in declaration order.
    pub fn namespace_members(&self, namespace: SymbolId) -> &[SymbolId] {
        self.symbols.members(namespace)
    }

    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    pub fn get_type(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id)
    }

    /// Type of a model, operation or interface symbol. Templated symbols map
    /// to their uninstantiated view.
    pub fn type_of(&self, symbol: SymbolId) -> Option<TypeId> {
        self.symbol_types.get(&symbol).copied()
    }

    /// Type of a declaration by dotted name, e.g. `"A.B.Pet"`.
    pub fn resolve_type(&self, qualified_name: &str) -> Option<TypeId> {
        self.type_of(self.symbols.resolve_qualified(qualified_name)?)
    }

    pub fn state(&self) -> &StateMap {
        &self.state
    }

    /// Types marked with `@test`, by test name, in type order.
    pub fn test_types(&self) -> FxHashMap<String, TypeId> {
        self.state
            .targets(keys::TEST)
            .filter_map(|(target, values)| match target {
                DecoratorTarget::Type(id) => {
                    let name = values.first()?.as_str()?;
                    Some((name.to_string(), *id))
                }
                DecoratorTarget::Property { .. } => None,
            })
            .collect()
    }

    /// Instances of a templated declaration, in creation order.
    pub fn template_instances(&self, template: SymbolId) -> &[TypeId] {
        self.instances.instances_of(template)
    }

    /// Human-readable rendering of a type, e.g. `A.Page<string>` or `string | int32`.
    pub fn type_name(&self, id: TypeId) -> String {
        let Some(ty) = self.types.get(id) else {
            return "<unresolved>".to_string();
        };
        match ty {
            Type::Intrinsic(kind) => kind.name().to_string(),
            Type::Model(model) => match model.symbol {
                Some(symbol) => {
                    let arguments = model.template.as_ref().map(|t| t.arguments.as_slice());
                    self.declared_name(symbol, arguments)
                }
                None => {
                    let properties: Vec<String> = model
                        .properties
                        .iter()
                        .map(|p| {
                            let optional = if p.optional { "?" } else { "" };
                            format!("{}{}: {}", p.name, optional, self.type_name(p.ty))
                        })
                        .collect();
                    format!("{{ {} }}", properties.join(", "))
                }
            },
            Type::Operation(operation) => match operation.symbol {
                Some(symbol) => {
                    let arguments = operation.template.as_ref().map(|t| t.arguments.as_slice());
                    self.declared_name(symbol, arguments)
                }
                None => operation.name.clone(),
            },
            Type::Interface(interface) => match interface.symbol {
                Some(symbol) => self.symbols.qualified_name(symbol),
                None => interface.name.clone(),
            },
            Type::Union(union) => union
                .options
                .iter()
                .map(|option| self.type_name(*option))
                .collect::<Vec<_>>()
                .join(" | "),
            Type::TemplateParameter(param) => param.name.clone(),
            Type::Error => "<error>".to_string(),
        }
    }

    fn declared_name(&self, symbol: SymbolId, arguments: Option<&[TypeId]>) -> String {
        let name = self.symbols.qualified_name(symbol);
        match arguments {
            Some(arguments) if !arguments.is_empty() => {
                let rendered: Vec<String> = arguments.iter().map(|a| self.type_name(*a)).collect();
                format!("{name}<{}>", rendered.join(", "))
            }
            _ => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use cadl_core::{DiagnosticCode, HostError};

    use super::*;

    #[derive(Default)]
    struct MapHost {
        files: HashMap<PathBuf, String>,
        logs: RefCell<Vec<LogLine>>,
    }

    impl MapHost {
        fn with(mut self, path: &str, contents: &str) -> Self {
            self.files.insert(PathBuf::from(path), contents.to_string());
            self
        }
    }

    impl CompilerHost for MapHost {
        fn read_file(&self, path: &Path) -> Result<String, HostError> {
            self.files.get(path).cloned().ok_or_else(|| HostError::NotFound {
                path: path.to_path_buf(),
            })
        }

        fn write_file(&self, _path: &Path, _contents: &str) -> Result<(), HostError> {
            Ok(())
        }

        fn log(&self, line: LogLine) {
            self.logs.borrow_mut().push(line);
        }
    }

    #[test]
    fn imports_load_after_the_entry_in_discovery_order() {
        let host = MapHost::default()
            .with("/p/main.cadl", "import \"./b.cadl\"; import \"./a.cadl\"; model M {}")
            .with("/p/a.cadl", "model A {}")
            .with("/p/b.cadl", "import \"./a.cadl\"; model B {}");
        let program = Compiler::new()
            .compile("/p/main.cadl", &host, &CompilerOptions::default())
            .expect("compiles");

        let paths: Vec<_> = program.source_files().iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            [
                PathBuf::from(stdlib::STDLIB_PATH),
                PathBuf::from("/p/main.cadl"),
                PathBuf::from("/p/b.cadl"),
                PathBuf::from("/p/a.cadl"),
            ]
        );
        assert_eq!(program.source_files()[1].id, SourceFileId::new(1));
        assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());
    }

    #[test]
    fn missing_import_is_fatal() {
        let host = MapHost::default().with("/p/main.cadl", "import \"./gone.cadl\";");
        let error = Compiler::new()
            .compile("/p/main.cadl", &host, &CompilerOptions::default())
            .expect_err("missing import");
        assert!(matches!(
            error,
            CompileError::SourceNotFound { ref path, imported_from: Some(_) } if path == Path::new("/p/gone.cadl")
        ));
    }

    #[test]
    fn nostdlib_leaves_primitives_undefined() {
        let host = MapHost::default().with("/main.cadl", "model A { s: string }");
        let options = CompilerOptions::default().nostdlib(true);
        let program = Compiler::new().compile("/main.cadl", &host, &options).expect("compiles");
        let codes: Vec<_> = program.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, [DiagnosticCode::UnknownIdentifier]);
        assert_eq!(program.source_files().len(), 1);
    }

    #[test]
    fn fingerprint_tracks_contents() {
        let host = MapHost::default().with("/main.cadl", "model A {}");
        let program = Compiler::new()
            .compile("/main.cadl", &host, &CompilerOptions::default())
            .expect("compiles");
        let file = program.source_file(SourceFileId::new(1)).expect("entry");
        assert_eq!(file.fingerprint, xxh64(b"model A {}", 0));
    }

    #[test]
    fn trace_lines_go_to_the_host() {
        let host = MapHost::default().with("/main.cadl", "model A {}");
        let options = CompilerOptions::default().with_trace("*");
        Compiler::new().compile("/main.cadl", &host, &options).expect("compiles");
        let areas: Vec<_> = host.logs.borrow().iter().filter_map(|l| l.area).collect();
        assert_eq!(areas, ["load", "bind", "check"]);
    }

    #[test]
    fn type_names_render_instances() {
        let host = MapHost::default().with(
            "/main.cadl",
            "namespace N; model Page<T> { items: T[] } model A { p: Page<string>; u: string | int32 }",
        );
        let program = Compiler::new()
            .compile("/main.cadl", &host, &CompilerOptions::default())
            .expect("compiles");
        let a = program.resolve_type("N.A").expect("A");
        let model = program.get_type(a).and_then(Type::as_model).expect("model");
        let name_of = |property: &str| model.property(property).map(|p| program.type_name(p.ty));
        assert_eq!(name_of("p").as_deref(), Some("N.Page<string>"));
        assert_eq!(name_of("u").as_deref(), Some("string | int32"));
    }
}
