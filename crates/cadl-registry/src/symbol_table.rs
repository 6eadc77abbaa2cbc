//! Per-compilation symbol storage and name lookup.

use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;

use crate::namespace_tree::{NamespaceMembers, NamespaceTree, ResolutionResult};
use crate::scope::{LocalScope, LocalScopeId, LocalScopeKind, ScopeRef};
use crate::symbol::{Declaration, Symbol, SymbolFlags, SymbolId, SymbolKind};

/// Outcome of declaring a name in a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    /// A new reachable symbol.
    New(SymbolId),
    /// Another declaration of an existing namespace.
    Merged(SymbolId),
    /// The name was taken. `shadowed` exists but lookup never finds it.
    Duplicate { shadowed: SymbolId, existing: SymbolId },
}

impl Declared {
    /// The symbol this declaration belongs to.
    pub fn id(self) -> SymbolId {
        match self {
            Declared::New(id) | Declared::Merged(id) => id,
            Declared::Duplicate { shadowed, .. } => shadowed,
        }
    }
}

/// All symbols and scopes of one compilation.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    locals: Vec<LocalScope>,
    tree: NamespaceTree,
    /// Namespaces that lost their name to another declaration, by parent and name.
    shadowed_namespaces: FxHashMap<(NodeIndex, String), SymbolId>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table holding only the global namespace.
    pub fn new() -> Self {
        let root_id = SymbolId::new(0);
        let tree = NamespaceTree::new(root_id);
        let mut root = Symbol::new(root_id, "", SymbolKind::Namespace, ScopeRef::Namespace(tree.root()));
        root.namespace = Some(tree.root());
        Self {
            symbols: vec![root],
            locals: Vec::new(),
            tree,
            shadowed_namespaces: FxHashMap::default(),
        }
    }

    // ==========================================================================
    // Access
    // ==========================================================================

    pub fn global_namespace(&self) -> SymbolId {
        SymbolId::new(0)
    }

    pub fn root_scope(&self) -> ScopeRef {
        ScopeRef::Namespace(self.tree.root())
    }

    pub fn tree(&self) -> &NamespaceTree {
        &self.tree
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols in creation order, shadowed ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn local(&self, id: LocalScopeId) -> &LocalScope {
        &self.locals[id.index()]
    }

    /// Reachable members of a namespace or interface, in declaration order.
    pub fn members(&self, id: SymbolId) -> &[SymbolId] {
        let symbol = self.symbol(id);
        if let Some(node) = symbol.namespace {
            return self
                .tree
                .node(node)
                .map(NamespaceMembers::members)
                .unwrap_or(&[]);
        }
        match symbol.members {
            Some(scope) => self.local(scope).symbols(),
            None => &[],
        }
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    fn push_symbol(&mut self, name: &str, kind: SymbolKind, parent: ScopeRef) -> SymbolId {
        let id = SymbolId::new(self.symbols.len() as u32);
        self.symbols.push(Symbol::new(id, name, kind, parent));
        id
    }

    fn insert_name(&mut self, scope: ScopeRef, name: &str, id: SymbolId) -> Result<(), SymbolId> {
        match scope {
            ScopeRef::Namespace(node) => match self.tree.node_mut(node) {
                Some(data) => data.insert(name, id),
                None => Err(id),
            },
            ScopeRef::Local(local) => self.locals[local.index()].insert(name, id),
        }
    }

    fn lookup_in(&self, scope: ScopeRef, name: &str) -> Option<SymbolId> {
        match scope {
            ScopeRef::Namespace(node) => self.tree.node(node)?.get(name),
            ScopeRef::Local(local) => self.locals.get(local.index())?.get(name),
        }
    }

    /// Declare a non-namespace symbol.
    pub fn declare(
        &mut self,
        scope: ScopeRef,
        name: &str,
        kind: SymbolKind,
        declaration: Declaration,
    ) -> Declared {
        let id = self.push_symbol(name, kind, scope);
        self.symbols[id.index()].declarations.push(declaration);
        match self.insert_name(scope, name, id) {
            Ok(()) => Declared::New(id),
            Err(existing) => {
                self.symbols[id.index()].flags |= SymbolFlags::SHADOWED;
                Declared::Duplicate {
                    shadowed: id,
                    existing,
                }
            }
        }
    }

    /// Declare (or reopen) the namespace `name` inside `parent`.
    ///
    /// Reopening an existing namespace appends `declaration` to it. A name held
    /// by anything else yields a shadowed namespace with its own node; later
    /// blocks with the same name are appended to that shadowed namespace and
    /// are reported as duplicates again.
    pub fn declare_namespace(
        &mut self,
        parent: NodeIndex,
        name: &str,
        declaration: Option<Declaration>,
    ) -> Declared {
        let existing = self.tree.node(parent).and_then(|data| data.get(name));
        if let Some(existing) = existing {
            if self.symbol(existing).kind == SymbolKind::Namespace {
                self.symbols[existing.index()].declarations.extend(declaration);
                return Declared::Merged(existing);
            }
            if let Some(shadowed) = self.shadowed_namespaces.get(&(parent, name.to_string())) {
                let shadowed = *shadowed;
                self.symbols[shadowed.index()].declarations.extend(declaration);
                return Declared::Duplicate { shadowed, existing };
            }
        }

        let id = self.push_symbol(name, SymbolKind::Namespace, ScopeRef::Namespace(parent));
        let node = self.tree.add_child(parent, name, id);
        let symbol = &mut self.symbols[id.index()];
        symbol.namespace = Some(node);
        symbol.declarations.extend(declaration);

        match self.insert_name(ScopeRef::Namespace(parent), name, id) {
            Ok(()) => Declared::New(id),
            Err(existing) => {
                self.symbols[id.index()].flags |= SymbolFlags::SHADOWED;
                self.shadowed_namespaces.insert((parent, name.to_string()), id);
                Declared::Duplicate {
                    shadowed: id,
                    existing,
                }
            }
        }
    }

    /// Create a local scope owned by `owner` and attach it to the symbol.
    pub fn create_local_scope(&mut self, kind: LocalScopeKind, parent: ScopeRef) -> LocalScopeId {
        let id = LocalScopeId::new(self.locals.len() as u32);
        self.locals.push(LocalScope::new(kind, parent));
        match kind {
            LocalScopeKind::TemplateParameters(owner) => {
                self.symbols[owner.index()].template_scope = Some(id);
            }
            LocalScopeKind::Interface(owner) => {
                self.symbols[owner.index()].members = Some(id);
            }
        }
        id
    }

    pub fn add_using(&mut self, from: NodeIndex, target: NodeIndex) {
        self.tree.add_using(from, target);
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Innermost namespace enclosing `scope`.
    pub fn enclosing_namespace(&self, mut scope: ScopeRef) -> NodeIndex {
        loop {
            match scope {
                ScopeRef::Namespace(node) => return node,
                ScopeRef::Local(local) => scope = self.local(local).parent,
            }
        }
    }

    /// Resolve an unqualified name from `scope`.
    ///
    /// Search order:
    /// 1. Local scopes, innermost first
    /// 2. Enclosing namespaces up to the global namespace
    /// 3. Namespaces brought in by `using` at any enclosing namespace
    ///    (non-transitive)
    pub fn lookup(&self, scope: ScopeRef, name: &str) -> ResolutionResult<SymbolId> {
        self.lookup_where(scope, name, |_| true)
    }

    /// Like [`lookup`](Self::lookup), skipping symbols `accept` rejects.
    pub fn lookup_where(
        &self,
        scope: ScopeRef,
        name: &str,
        accept: impl Fn(&Symbol) -> bool,
    ) -> ResolutionResult<SymbolId> {
        let mut current = Some(scope);
        let mut innermost_namespace = None;
        while let Some(scope) = current {
            if let Some(found) = self.lookup_in(scope, name) {
                if accept(self.symbol(found)) {
                    return ResolutionResult::Found(found);
                }
            }
            current = match scope {
                ScopeRef::Local(local) => Some(self.local(local).parent),
                ScopeRef::Namespace(node) => {
                    innermost_namespace.get_or_insert(node);
                    self.tree.parent(node).map(ScopeRef::Namespace)
                }
            };
        }

        match innermost_namespace {
            Some(node) => self
                .tree
                .lookup_via_usings(node, name, |id| accept(self.symbol(id))),
            None => ResolutionResult::NotFound,
        }
    }

    /// Resolve `name` as a member of a namespace or interface.
    pub fn lookup_member(&self, container: SymbolId, name: &str) -> Option<SymbolId> {
        let symbol = self.symbol(container);
        if let Some(node) = symbol.namespace {
            return self.tree.node(node)?.get(name);
        }
        symbol.members.and_then(|scope| self.local(scope).get(name))
    }

    /// Resolve a dotted namespace path from the global namespace.
    pub fn resolve_namespace_path<S: AsRef<str>>(&self, path: &[S]) -> Option<SymbolId> {
        let mut current = self.global_namespace();
        for segment in path {
            let next = self.lookup_member(current, segment.as_ref())?;
            if self.symbol(next).kind != SymbolKind::Namespace {
                return None;
            }
            current = next;
        }
        Some(current)
    }

    /// Resolve a dotted name (`A.B.Pet`) from the global namespace.
    pub fn resolve_qualified(&self, qualified_name: &str) -> Option<SymbolId> {
        let mut current = self.global_namespace();
        for segment in qualified_name.split('.') {
            current = self.lookup_member(current, segment)?;
        }
        Some(current)
    }

    /// Dotted name of a symbol, e.g. `A.B.Pet` or `A.Store.get`.
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let symbol = self.symbol(id);
        if id == self.global_namespace() {
            return String::new();
        }
        match symbol.parent {
            ScopeRef::Namespace(node) => self.tree.qualified_name(node, &symbol.name),
            ScopeRef::Local(local) => match self.local(local).kind {
                LocalScopeKind::Interface(owner) => {
                    format!("{}.{}", self.qualified_name(owner), symbol.name)
                }
                LocalScopeKind::TemplateParameters(_) => symbol.name.clone(),
            },
        }
    }
}
