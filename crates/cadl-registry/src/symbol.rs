//! Symbols produced by the binder.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use cadl_core::{Location, SourceFileId, Span};
use cadl_parser::ast::{InterfaceDecl, ModelDecl, NamespaceDecl, OperationDecl, TemplateParamDecl};
use petgraph::graph::NodeIndex;

use crate::scope::{LocalScopeId, ScopeRef};

/// Index of a symbol in its [`SymbolTable`](crate::SymbolTable).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// Index of a decorator definition in the active decorator library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoratorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Namespace,
    Model,
    Operation,
    Interface,
    TemplateParameter,
    Decorator,
}

impl SymbolKind {
    pub fn name(self) -> &'static str {
        match self {
            SymbolKind::Namespace => "namespace",
            SymbolKind::Model => "model",
            SymbolKind::Operation => "operation",
            SymbolKind::Interface => "interface",
            SymbolKind::TemplateParameter => "template parameter",
            SymbolKind::Decorator => "decorator",
        }
    }

    /// Whether a reference to this symbol can produce a type.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            SymbolKind::Model
                | SymbolKind::Operation
                | SymbolKind::Interface
                | SymbolKind::TemplateParameter
        )
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolFlags: u8 {
        /// Lost a name clash: still checked, never found by lookup.
        const SHADOWED = 1 << 0;
        /// Declares template parameters.
        const TEMPLATED = 1 << 1;
        /// Operation declared inside an interface.
        const INTERFACE_MEMBER = 1 << 2;
    }
}

/// The syntax a declaration came from.
#[derive(Debug, Clone)]
pub enum DeclarationNode {
    /// Intermediate segment of a dotted namespace path; no syntax of its own.
    ImplicitNamespace,
    Namespace(Arc<NamespaceDecl>),
    Model(Arc<ModelDecl>),
    Operation(Arc<OperationDecl>),
    Interface(Arc<InterfaceDecl>),
    TemplateParameter(TemplateParamDecl),
    Decorator(DecoratorId),
}

/// One declaration site of a symbol.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub file: SourceFileId,
    /// Span of the declared name.
    pub span: Span,
    pub node: DeclarationNode,
}

impl Declaration {
    pub fn new(file: SourceFileId, span: Span, node: DeclarationNode) -> Self {
        Self { file, span, node }
    }

    pub fn location(&self) -> Location {
        Location::new(self.file, self.span)
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub flags: SymbolFlags,
    /// Scope the symbol was declared in.
    pub parent: ScopeRef,
    /// Every declaration site. Only namespaces ever have more than one.
    pub declarations: Vec<Declaration>,
    /// Template parameter symbols in declaration order.
    pub template_params: Vec<SymbolId>,
    /// Scope holding `template_params`; bodies resolve names from here.
    pub template_scope: Option<LocalScopeId>,
    /// Member scope of an interface.
    pub members: Option<LocalScopeId>,
    /// Node of a namespace symbol in the namespace tree.
    pub namespace: Option<NodeIndex>,
}

impl Symbol {
    pub fn new(id: SymbolId, name: impl Into<String>, kind: SymbolKind, parent: ScopeRef) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            flags: SymbolFlags::empty(),
            parent,
            declarations: Vec::new(),
            template_params: Vec::new(),
            template_scope: None,
            members: None,
            namespace: None,
        }
    }

    pub fn is_shadowed(&self) -> bool {
        self.flags.contains(SymbolFlags::SHADOWED)
    }

    pub fn is_templated(&self) -> bool {
        self.flags.contains(SymbolFlags::TEMPLATED)
    }

    /// The first declaration, the one diagnostics point at.
    pub fn declaration(&self) -> Option<&Declaration> {
        self.declarations.first()
    }

    pub fn location(&self) -> Option<Location> {
        self.declaration().map(Declaration::location)
    }

    /// Scope that names inside this symbol's body resolve from.
    pub fn body_scope(&self) -> ScopeRef {
        match self.template_scope {
            Some(scope) => ScopeRef::Local(scope),
            None => self.parent,
        }
    }
}
