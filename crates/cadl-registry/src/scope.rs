//! Lexical scopes.
//!
//! Namespace scopes are nodes of the [`NamespaceTree`](crate::NamespaceTree).
//! Everything narrower (template parameter lists, interface bodies) is a
//! [`LocalScope`] chained to its parent.

use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;

use crate::symbol::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalScopeId(u32);

impl LocalScopeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A position in the scope chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeRef {
    Namespace(NodeIndex),
    Local(LocalScopeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalScopeKind {
    /// Template parameters of the owning declaration.
    TemplateParameters(SymbolId),
    /// Member operations of the owning interface.
    Interface(SymbolId),
}

/// Ordered name table for a non-namespace scope.
#[derive(Debug, Clone)]
pub struct LocalScope {
    pub kind: LocalScopeKind,
    pub parent: ScopeRef,
    names: FxHashMap<String, SymbolId>,
    order: Vec<SymbolId>,
}

impl LocalScope {
    pub fn new(kind: LocalScopeKind, parent: ScopeRef) -> Self {
        Self {
            kind,
            parent,
            names: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.names.get(name).copied()
    }

    /// Insert unless the name is taken. Returns the current holder on clash.
    pub fn insert(&mut self, name: &str, symbol: SymbolId) -> Result<(), SymbolId> {
        if let Some(&existing) = self.names.get(name) {
            return Err(existing);
        }
        self.names.insert(name.to_string(), symbol);
        self.order.push(symbol);
        Ok(())
    }

    /// Reachable symbols in declaration order.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.order
    }

    pub fn owner(&self) -> SymbolId {
        match self.kind {
            LocalScopeKind::TemplateParameters(owner) | LocalScopeKind::Interface(owner) => owner,
        }
    }
}
