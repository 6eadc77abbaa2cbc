//! Binding Pass - declare every symbol of every file.
//!
//! Walks the AST forest in load order and fills the [`SymbolTable`]. Nothing is
//! resolved here except `using` targets, which are checked once every file has
//! contributed its namespaces.
//!
//! ## Responsibilities
//!
//! - Declare the decorator library in the global namespace
//! - Merge namespace declarations across and within files
//! - Declare models, operations, interfaces and their template parameters
//! - Report duplicate names; the loser is kept as a shadowed symbol
//! - Wire `using` directives into the namespace tree

use std::sync::Arc;

use cadl_core::{Diagnostic, DiagnosticCode, DiagnosticCollector, Location, SourceFileId, Span};
use cadl_parser::ast::{
    Ident, InterfaceDecl, Item, ModelDecl, NamespaceDecl, OperationDecl, Script, TemplateParamDecl,
    UsingDecl,
};
use cadl_registry::{
    Declaration, DeclarationNode, Declared, LocalScopeKind, NodeIndex, ScopeRef, SymbolFlags,
    SymbolId, SymbolKind, SymbolTable,
};

use crate::decorators::DecoratorLibrary;

/// Output of the binding pass.
#[derive(Debug, Default)]
pub struct BindingOutput {
    pub files_bound: usize,
    /// Symbols created, shadowed ones included.
    pub symbols_declared: usize,
    /// Namespace declarations folded into an existing namespace.
    pub namespaces_merged: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// A `using` seen while binding, resolved in [`BindingPass::finish`].
struct PendingUsing {
    namespace: NodeIndex,
    path: Vec<String>,
    location: Location,
}

pub struct BindingPass<'a> {
    table: &'a mut SymbolTable,
    diagnostics: DiagnosticCollector,
    pending_usings: Vec<PendingUsing>,
    files_bound: usize,
    symbols_declared: usize,
    namespaces_merged: usize,
}

impl<'a> BindingPass<'a> {
    pub fn new(table: &'a mut SymbolTable) -> Self {
        Self {
            table,
            diagnostics: DiagnosticCollector::new(),
            pending_usings: Vec::new(),
            files_bound: 0,
            symbols_declared: 0,
            namespaces_merged: 0,
        }
    }

    /// Declare every decorator of `library` in the global namespace.
    pub fn bind_library(&mut self, library: &DecoratorLibrary) {
        let root = self.table.root_scope();
        for (id, definition) in library.iter() {
            let declaration = Declaration::new(
                SourceFileId::STDLIB,
                Span::default(),
                DeclarationNode::Decorator(id),
            );
            let declared = self
                .table
                .declare(root, &definition.name, SymbolKind::Decorator, declaration);
            self.record(declared, &definition.name, None);
        }
    }

    /// Bind one file.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn bind_script(&mut self, script: &Script) {
        let root = self.table.tree().root();
        for item in script.items() {
            self.visit_item(script.file, root, item);
        }
        self.files_bound += 1;
    }

    /// Resolve `using` directives and hand back the collected output.
    pub fn finish(mut self) -> BindingOutput {
        for using in std::mem::take(&mut self.pending_usings) {
            match self.table.resolve_namespace_path(&using.path) {
                Some(target) => {
                    if let Some(target_node) = self.table.symbol(target).namespace {
                        self.table.add_using(using.namespace, target_node);
                    }
                }
                None => self.diagnostics.add(
                    Diagnostic::new(
                        DiagnosticCode::UnknownNamespace,
                        format!("Unknown namespace '{}'.", using.path.join(".")),
                    )
                    .at(using.location),
                ),
            }
        }

        tracing::debug!(
            files = self.files_bound,
            symbols = self.symbols_declared,
            merged = self.namespaces_merged,
            "binding finished"
        );

        BindingOutput {
            files_bound: self.files_bound,
            symbols_declared: self.symbols_declared,
            namespaces_merged: self.namespaces_merged,
            diagnostics: self.diagnostics.into_vec(),
        }
    }

    // ==========================================================================
    // Items
    // ==========================================================================

    fn visit_item(&mut self, file: SourceFileId, namespace: NodeIndex, item: &Item) {
        match item {
            Item::Namespace(decl) => self.visit_namespace(file, namespace, decl),
            Item::Model(decl) => self.visit_model(file, namespace, decl),
            Item::Operation(decl) => {
                self.visit_operation(file, ScopeRef::Namespace(namespace), decl, SymbolFlags::empty());
            }
            Item::Interface(decl) => self.visit_interface(file, namespace, decl),
            Item::Using(decl) => self.visit_using(file, namespace, decl),
        }
    }

    fn visit_namespace(&mut self, file: SourceFileId, parent: NodeIndex, decl: &Arc<NamespaceDecl>) {
        let Some((last, intermediate)) = decl.path.split_last() else {
            return;
        };

        let mut current = parent;
        for segment in intermediate {
            let implicit = Declaration::new(file, segment.span, DeclarationNode::ImplicitNamespace);
            current = self.enter_namespace(current, segment, implicit);
        }

        let declaration = Declaration::new(file, last.span, DeclarationNode::Namespace(decl.clone()));
        let node = self.enter_namespace(current, last, declaration);

        for item in &decl.items {
            self.visit_item(file, node, item);
        }
    }

    /// Declare or reopen one namespace segment and return its node.
    fn enter_namespace(&mut self, parent: NodeIndex, name: &Ident, declaration: Declaration) -> NodeIndex {
        let location = declaration.location();
        let declared = self.table.declare_namespace(parent, &name.name, Some(declaration));
        self.record(declared, &name.name, Some(location));

        let id = declared.id();
        match self.table.symbol(id).namespace {
            Some(node) => node,
            None => parent,
        }
    }

    fn visit_model(&mut self, file: SourceFileId, namespace: NodeIndex, decl: &Arc<ModelDecl>) {
        let scope = ScopeRef::Namespace(namespace);
        let declaration = Declaration::new(file, decl.name.span, DeclarationNode::Model(decl.clone()));
        let id = self.declare(scope, &decl.name, SymbolKind::Model, declaration);
        self.declare_template_params(file, id, scope, &decl.template_params);
    }

    fn visit_operation(
        &mut self,
        file: SourceFileId,
        scope: ScopeRef,
        decl: &Arc<OperationDecl>,
        flags: SymbolFlags,
    ) -> SymbolId {
        let declaration = Declaration::new(file, decl.name.span, DeclarationNode::Operation(decl.clone()));
        let id = self.declare(scope, &decl.name, SymbolKind::Operation, declaration);
        self.table.symbol_mut(id).flags |= flags;
        self.declare_template_params(file, id, scope, &decl.template_params);
        id
    }

    fn visit_interface(&mut self, file: SourceFileId, namespace: NodeIndex, decl: &Arc<InterfaceDecl>) {
        let scope = ScopeRef::Namespace(namespace);
        let declaration = Declaration::new(file, decl.name.span, DeclarationNode::Interface(decl.clone()));
        let id = self.declare(scope, &decl.name, SymbolKind::Interface, declaration);

        let members = self
            .table
            .create_local_scope(LocalScopeKind::Interface(id), scope);
        for operation in &decl.operations {
            self.visit_operation(
                file,
                ScopeRef::Local(members),
                operation,
                SymbolFlags::INTERFACE_MEMBER,
            );
        }
    }

    fn visit_using(&mut self, file: SourceFileId, namespace: NodeIndex, decl: &UsingDecl) {
        self.pending_usings.push(PendingUsing {
            namespace,
            path: decl.path.iter().map(|ident| ident.name.clone()).collect(),
            location: Location::new(file, decl.span),
        });
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    fn declare(
        &mut self,
        scope: ScopeRef,
        name: &Ident,
        kind: SymbolKind,
        declaration: Declaration,
    ) -> SymbolId {
        let location = declaration.location();
        let declared = self.table.declare(scope, &name.name, kind, declaration);
        self.record(declared, &name.name, Some(location));
        declared.id()
    }

    fn declare_template_params(
        &mut self,
        file: SourceFileId,
        owner: SymbolId,
        parent: ScopeRef,
        params: &[TemplateParamDecl],
    ) {
        if params.is_empty() {
            return;
        }
        self.table.symbol_mut(owner).flags |= SymbolFlags::TEMPLATED;
        let scope = self
            .table
            .create_local_scope(LocalScopeKind::TemplateParameters(owner), parent);

        for param in params {
            let declaration = Declaration::new(
                file,
                param.name.span,
                DeclarationNode::TemplateParameter(param.clone()),
            );
            let id = self.declare(
                ScopeRef::Local(scope),
                &param.name,
                SymbolKind::TemplateParameter,
                declaration,
            );
            self.table.symbol_mut(owner).template_params.push(id);
        }
    }

    fn record(&mut self, declared: Declared, name: &str, location: Option<Location>) {
        match declared {
            Declared::New(_) => self.symbols_declared += 1,
            Declared::Merged(_) => self.namespaces_merged += 1,
            Declared::Duplicate { .. } => {
                self.symbols_declared += 1;
                self.diagnostics.add(
                    Diagnostic::new(
                        DiagnosticCode::DuplicateSymbol,
                        format!("Duplicate name: \"{name}\""),
                    )
                    .at_opt(location),
                );
            }
        }
    }
}
