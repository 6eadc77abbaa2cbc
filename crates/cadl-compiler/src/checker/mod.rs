//! Type checker and template instantiator.
//!
//! Checking is demand-driven: every declaration is resolved the first time
//! something needs it, memoized per `(declaration, template arguments)` key.
//! [`check`] then walks every declaration so that unreferenced ones are checked
//! too.
//!
//! ## Resolution states
//!
//! ```text
//! (absent) ──reserve──▶ Resolving(id) ──finish──▶ Resolved(id)
//!                        │        ▲  │
//!                        ▼        │  └──complete demand in a complete chain──▶ Errored
//!                     Deferred(id)
//! ```
//!
//! A *reference* demand (property type, return type, union option, `extends`
//! base, decorator argument) on a `Resolving` key gets the reserved handle,
//! which is how `model Node { next?: Node }` works. A *complete* demand (`is`,
//! spread, operation reuse) needs the finished structure.
//!
//! A complete demand on a `Resolving` key is a cycle only when every
//! resolution started between that key and the demand was itself a complete
//! demand. Otherwise some resolution on the way was started by a mere
//! reference, e.g. `model A { b?: B } model B is A {}` reaching `B` from
//! `A.b`. That resolution is abandoned: its reporting is muted while it
//! unwinds, its handle is returned to the referencing declaration, and it is
//! resolved again into the same handle once the current top-level
//! declaration is done.
//!
//! ## Modules
//!
//! - `references`: type expressions, name paths, template instantiation
//! - `models`: models, members, model expressions
//! - `operations`: operations, reuse, interfaces
//! - `decorators`: resolving and invoking decorators

mod decorators;
mod models;
mod operations;
mod references;

use anyhow::anyhow;
use cadl_core::{
    CompilerOptions, Diagnostic, DiagnosticCode, DiagnosticCollector, InternalError, Location,
    SourceFileId, Span,
};
use cadl_registry::{DeclarationNode, ScopeRef, SymbolId, SymbolKind, SymbolTable};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::decorators::{DecoratorLibrary, StateMap};
use crate::template::{SubstitutionMap, TemplateInstanceCache, build_substitution_map};
use crate::types::{TemplateInstance, TemplateParameterType, Type, TypeArena, TypeId};

/// Nesting limit for resolution and instantiation. Reached only by templates
/// that expand without bound, e.g. `model Nest<T> { inner: Nest<Nest<T>> }`.
const MAX_RESOLUTION_DEPTH: usize = 64;

/// Everything the checker produced.
#[derive(Debug)]
pub struct CheckOutput {
    pub types: TypeArena,
    pub state: StateMap,
    /// Type of each model, operation and interface symbol. Templated
    /// declarations map to their uninstantiated view.
    pub symbol_types: FxHashMap<SymbolId, TypeId>,
    pub instances: TemplateInstanceCache,
    pub diagnostics: Vec<Diagnostic>,
    pub internal_errors: Vec<InternalError>,
}

/// Check every declaration in `symbols`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn check(
    symbols: &SymbolTable,
    library: &DecoratorLibrary,
    options: &CompilerOptions,
) -> CheckOutput {
    let mut checker = Checker::new(symbols, library, options);
    checker.check_all();
    checker.finish_output()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolutionState {
    Resolving(TypeId),
    /// Abandoned mid-way; resolved again later into the same handle.
    Deferred(TypeId),
    Resolved(TypeId),
    Errored,
}

type ResolutionKey = (SymbolId, Vec<TypeId>);

/// A resolution in progress.
#[derive(Debug)]
struct Frame {
    key: ResolutionKey,
    id: TypeId,
    /// The demand that started it.
    demand: Demand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Demand {
    /// A handle is enough; the type may still be under construction.
    Reference,
    /// The finished structure is needed.
    Complete,
}

/// Where a piece of syntax is being checked.
pub(crate) struct Ctx<'m> {
    pub file: SourceFileId,
    pub scope: ScopeRef,
    pub subst: &'m SubstitutionMap,
    /// Checking a template body with unbound parameters. Decorators don't run.
    pub dependent: bool,
}

impl Ctx<'_> {
    fn location(&self, span: Span) -> Location {
        Location::new(self.file, span)
    }
}

pub(crate) struct Checker<'a> {
    symbols: &'a SymbolTable,
    library: &'a DecoratorLibrary,
    options: &'a CompilerOptions,
    types: TypeArena,
    state: StateMap,
    resolutions: FxHashMap<ResolutionKey, ResolutionState>,
    stack: Vec<Frame>,
    /// Set while the frame at this stack index unwinds after being abandoned.
    abandoning: Option<usize>,
    deferred: Vec<ResolutionKey>,
    model_expressions: FxHashMap<Vec<(String, TypeId, bool)>, TypeId>,
    /// Declaration behind each handle reserved by the state machine.
    reserved: FxHashMap<TypeId, SymbolId>,
    instances: TemplateInstanceCache,
    param_types: FxHashMap<SymbolId, TypeId>,
    symbol_types: FxHashMap<SymbolId, TypeId>,
    /// Types that mention an unbound template parameter.
    dependent_types: FxHashSet<TypeId>,
    diagnostics: DiagnosticCollector,
    /// Template bodies are checked once per instantiation; report each finding once.
    seen: FxHashSet<Diagnostic>,
    internal_errors: Vec<InternalError>,
    depth: usize,
}

impl<'a> Checker<'a> {
    pub(crate) fn new(
        symbols: &'a SymbolTable,
        library: &'a DecoratorLibrary,
        options: &'a CompilerOptions,
    ) -> Self {
        Self {
            symbols,
            library,
            options,
            types: TypeArena::new(),
            state: StateMap::new(),
            resolutions: FxHashMap::default(),
            stack: Vec::new(),
            abandoning: None,
            deferred: Vec::new(),
            model_expressions: FxHashMap::default(),
            reserved: FxHashMap::default(),
            instances: TemplateInstanceCache::new(),
            param_types: FxHashMap::default(),
            symbol_types: FxHashMap::default(),
            dependent_types: FxHashSet::default(),
            diagnostics: DiagnosticCollector::new(),
            seen: FxHashSet::default(),
            internal_errors: Vec::new(),
            depth: 0,
        }
    }

    fn check_all(&mut self) {
        let symbols = self.symbols;
        for symbol in symbols.iter() {
            match symbol.kind {
                SymbolKind::Model | SymbolKind::Operation | SymbolKind::Interface => {
                    let ty = self.check_declaration(symbol.id);
                    self.symbol_types.insert(symbol.id, ty);
                    self.resolve_deferred();
                }
                SymbolKind::Namespace => self.check_namespace_decorators(symbol.id),
                SymbolKind::TemplateParameter | SymbolKind::Decorator => {}
            }
        }
        self.resolve_deferred();
        tracing::debug!(
            types = self.types.len(),
            instances = self.instances.len(),
            diagnostics = self.diagnostics.len(),
            "checking finished"
        );
    }

    fn finish_output(self) -> CheckOutput {
        CheckOutput {
            types: self.types,
            state: self.state,
            symbol_types: self.symbol_types,
            instances: self.instances,
            diagnostics: self.diagnostics.into_vec(),
            internal_errors: self.internal_errors,
        }
    }

    // ==========================================================================
    // Reporting
    // ==========================================================================

    fn report(&mut self, diagnostic: Diagnostic) {
        // An abandoned resolution reports again when it is redone.
        if self.abandoning.is_some() {
            return;
        }
        if self.seen.insert(diagnostic.clone()) {
            self.diagnostics.add(diagnostic);
        }
    }

    fn error_at(&mut self, code: DiagnosticCode, message: impl Into<String>, location: Location) {
        self.report(Diagnostic::new(code, message).at(location));
    }

    fn internal_error(&mut self, error: InternalError) {
        tracing::error!(error = %error, "internal compiler error");
        self.internal_errors.push(error);
    }

    // ==========================================================================
    // Arena helpers
    // ==========================================================================

    fn error_type(&self) -> TypeId {
        self.types.error()
    }

    /// Store a type built outside the resolution state machine.
    fn alloc(&mut self, ty: Type, dependent: bool) -> TypeId {
        let id = self.types.alloc(ty);
        if dependent {
            self.dependent_types.insert(id);
        }
        id
    }

    fn finish(&mut self, id: TypeId, ty: Type) {
        if let Some(from) = self.abandoning {
            if self.stack[from..].iter().any(|frame| frame.id == id) {
                return;
            }
        }
        if let Err(error) = self.types.finish(id, ty) {
            self.internal_error(error.context("finishing a resolved type"));
        }
    }

    fn is_dependent(&self, id: TypeId) -> bool {
        self.dependent_types.contains(&id)
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    /// Resolve a declaration on its own: templated declarations get their
    /// uninstantiated view, with parameters standing for themselves.
    fn check_declaration(&mut self, symbol: SymbolId) -> TypeId {
        let params = self.symbols.symbol(symbol).template_params.clone();
        let args: Vec<TypeId> = params.iter().map(|p| self.param_type(*p)).collect();
        self.resolve_symbol(symbol, args, Demand::Reference, None)
    }

    /// Resolve `(symbol, args)` through the resolution state machine.
    fn resolve_symbol(
        &mut self,
        symbol: SymbolId,
        args: Vec<TypeId>,
        demand: Demand,
        at: Option<Location>,
    ) -> TypeId {
        let key = (symbol, args);
        let reserved = match self.resolutions.get(&key).copied() {
            Some(ResolutionState::Resolved(id)) => return id,
            Some(ResolutionState::Errored) => return self.error_type(),
            Some(ResolutionState::Resolving(id)) => {
                return match demand {
                    Demand::Reference => id,
                    Demand::Complete => self.complete_while_resolving(&key, at),
                };
            }
            Some(ResolutionState::Deferred(id)) if demand == Demand::Reference => return id,
            Some(ResolutionState::Deferred(id)) => Some(id),
            None => None,
        };

        // Nothing new starts while an abandoned frame unwinds.
        if self.abandoning.is_some() {
            let id = reserved.unwrap_or_else(|| self.reserve_for(&key));
            self.defer(key, id);
            return self.handed_out(id, demand);
        }

        if !self.enter(at) {
            if reserved.is_some() {
                self.deferred.push(key);
            }
            return self.error_type();
        }
        let id = reserved.unwrap_or_else(|| self.reserve_for(&key));
        self.resolve_into(key, id, demand)
    }

    /// Reserve the handle for a key seen for the first time.
    fn reserve_for(&mut self, key: &ResolutionKey) -> TypeId {
        let (symbol, args) = key;
        let id = self.types.reserve();
        self.reserved.insert(id, *symbol);
        if args.iter().any(|arg| self.is_dependent(*arg)) {
            self.dependent_types.insert(id);
        }
        if !args.is_empty() && !self.is_declaration_view(*symbol, args) {
            self.instances.insert(*symbol, args.clone(), id);
        }
        id
    }

    /// Kind of the declaration a state-machine handle was reserved for.
    fn reserved_kind(&self, id: TypeId) -> Option<SymbolKind> {
        self.reserved
            .get(&id)
            .map(|symbol| self.symbols.symbol(*symbol).kind)
    }

    /// Check the body of `key` into `id`. The caller has entered a nesting level.
    fn resolve_into(&mut self, key: ResolutionKey, id: TypeId, demand: Demand) -> TypeId {
        self.resolutions
            .insert(key.clone(), ResolutionState::Resolving(id));
        self.stack.push(Frame {
            key: key.clone(),
            id,
            demand,
        });

        let (symbol, args) = &key;
        let dependent = self.is_dependent(id);
        self.check_symbol_body(*symbol, args, id, dependent);
        self.depth -= 1;

        let index = self.stack.len() - 1;
        self.stack.pop();
        if let Some(from) = self.abandoning {
            if index >= from {
                if index == from {
                    self.abandoning = None;
                }
                self.defer(key, id);
                return self.handed_out(id, demand);
            }
        }

        match self.resolutions.get(&key).copied() {
            Some(ResolutionState::Resolving(_)) => {
                self.resolutions.insert(key, ResolutionState::Resolved(id));
                id
            }
            Some(ResolutionState::Errored) => self.error_type(),
            _ => id,
        }
    }

    /// A complete demand reached a key that is still being resolved.
    fn complete_while_resolving(&mut self, key: &ResolutionKey, at: Option<Location>) -> TypeId {
        if self.abandoning.is_some() {
            return self.error_type();
        }
        let Some(position) = self.stack.iter().rposition(|frame| frame.key == *key) else {
            self.internal_error(anyhow!(
                "'{}' is resolving but not on the resolution stack",
                self.symbols.qualified_name(key.0)
            ));
            return self.error_type();
        };

        let above = &self.stack[position + 1..];
        if let Some(offset) = above.iter().rposition(|frame| frame.demand == Demand::Reference) {
            let from = position + 1 + offset;
            tracing::trace!(
                symbol = %self.symbols.qualified_name(self.stack[from].key.0),
                "abandoning resolution reached by reference"
            );
            self.abandoning = Some(from);
            return self.error_type();
        }

        let (symbol, _) = key;
        let name = self.symbols.qualified_name(*symbol);
        let location = at.or_else(|| self.symbols.symbol(*symbol).location());
        self.report(
            Diagnostic::new(
                DiagnosticCode::CyclicReference,
                format!("Type '{name}' recursively references itself."),
            )
            .at_opt(location),
        );
        self.resolutions.insert(key.clone(), ResolutionState::Errored);
        self.error_type()
    }

    fn defer(&mut self, key: ResolutionKey, id: TypeId) {
        self.resolutions
            .insert(key.clone(), ResolutionState::Deferred(id));
        self.deferred.push(key);
    }

    /// What a caller gets back from a resolution that did not finish.
    fn handed_out(&self, id: TypeId, demand: Demand) -> TypeId {
        match demand {
            Demand::Reference => id,
            Demand::Complete => self.error_type(),
        }
    }

    /// Redo abandoned resolutions. Runs between top-level declarations, when
    /// nothing is resolving.
    fn resolve_deferred(&mut self) {
        while let Some(key) = self.deferred.pop() {
            let Some(ResolutionState::Deferred(id)) = self.resolutions.get(&key).copied() else {
                continue;
            };
            if self.enter(None) {
                self.resolve_into(key, id, Demand::Reference);
            }
        }
    }

    /// Whether `args` are the template's own parameters, in order.
    fn is_declaration_view(&self, symbol: SymbolId, args: &[TypeId]) -> bool {
        let params = &self.symbols.symbol(symbol).template_params;
        params.len() == args.len()
            && params
                .iter()
                .zip(args)
                .all(|(param, arg)| self.param_types.get(param) == Some(arg))
    }

    /// Track nesting depth. Returns false (and reports) when too deep.
    fn enter(&mut self, at: Option<Location>) -> bool {
        if self.depth >= MAX_RESOLUTION_DEPTH {
            self.report(
                Diagnostic::new(
                    DiagnosticCode::CyclicReference,
                    "Type resolution is nested too deeply; a template probably expands without bound.",
                )
                .at_opt(at),
            );
            return false;
        }
        self.depth += 1;
        true
    }

    fn check_symbol_body(&mut self, symbol_id: SymbolId, args: &[TypeId], id: TypeId, dependent: bool) {
        let symbols = self.symbols;
        let symbol = symbols.symbol(symbol_id);

        let subst = match build_substitution_map(&symbol.template_params, args) {
            Ok(subst) => subst,
            Err(error) => {
                self.internal_error(anyhow!(error).context(format!(
                    "instantiating '{}'",
                    symbols.qualified_name(symbol_id)
                )));
                self.finish(id, Type::Error);
                return;
            }
        };
        let template = (!args.is_empty()).then(|| TemplateInstance {
            declaration: symbol_id,
            arguments: args.to_vec(),
        });

        let Some(declaration) = symbol.declaration() else {
            self.internal_error(anyhow!(
                "symbol '{}' has no declaration",
                symbols.qualified_name(symbol_id)
            ));
            self.finish(id, Type::Error);
            return;
        };
        let ctx = Ctx {
            file: declaration.file,
            scope: symbol.body_scope(),
            subst: &subst,
            dependent,
        };

        match &declaration.node {
            DeclarationNode::Model(decl) => {
                self.check_model_declaration(symbol_id, decl, template, &ctx, id)
            }
            DeclarationNode::Operation(decl) => {
                self.check_operation_declaration(symbol_id, decl, template, &ctx, id)
            }
            DeclarationNode::Interface(decl) => {
                self.check_interface_declaration(symbol_id, decl, &ctx, id)
            }
            other => {
                let error = anyhow!("{other:?} declaration cannot produce a type")
                    .context(format!("checking '{}'", symbols.qualified_name(symbol_id)));
                self.internal_error(error);
                self.finish(id, Type::Error);
            }
        }
    }

    /// The type standing for an unbound template parameter.
    fn param_type(&mut self, param: SymbolId) -> TypeId {
        if let Some(id) = self.param_types.get(&param) {
            return *id;
        }

        let symbols = self.symbols;
        let symbol = symbols.symbol(param);
        let id = self.types.reserve();
        self.param_types.insert(param, id);
        self.dependent_types.insert(id);

        let default = match symbol.declaration() {
            Some(declaration) => match &declaration.node {
                DeclarationNode::TemplateParameter(decl) => decl.default.as_ref().map(|expr| {
                    let empty = SubstitutionMap::default();
                    let ctx = Ctx {
                        file: declaration.file,
                        scope: symbol.parent,
                        subst: &empty,
                        dependent: true,
                    };
                    self.check_type_expr(expr, &ctx, Demand::Reference)
                }),
                _ => None,
            },
            None => None,
        };

        self.finish(
            id,
            Type::TemplateParameter(TemplateParameterType {
                name: symbol.name.clone(),
                symbol: param,
                default,
            }),
        );
        id
    }

    /// Decorators on namespaces have no type to attach to.
    fn check_namespace_decorators(&mut self, namespace: SymbolId) {
        let symbols = self.symbols;
        let symbol = symbols.symbol(namespace);
        let Some(node) = symbol.namespace else {
            return;
        };
        let subst = SubstitutionMap::default();
        for declaration in &symbol.declarations {
            let DeclarationNode::Namespace(decl) = &declaration.node else {
                continue;
            };
            if decl.decorators.is_empty() {
                continue;
            }
            let ctx = Ctx {
                file: declaration.file,
                scope: ScopeRef::Namespace(node),
                subst: &subst,
                dependent: false,
            };
            for application in self.resolve_decorators(&decl.decorators, &ctx) {
                let message = format!("@{} cannot be applied to a namespace.", application.name);
                self.report(
                    Diagnostic::new(DiagnosticCode::InvalidDecoratorTarget, message)
                        .at_opt(application.location),
                );
            }
        }
    }
}
