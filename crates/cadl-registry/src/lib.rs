//! Symbols, scopes and the namespace tree for Cadl compilations.
//!
//! A [`SymbolTable`] is created per compilation and filled by the binder.
//! Nothing here knows about types: the checker maps symbols to types.

pub mod namespace_tree;
pub mod scope;
pub mod symbol;
pub mod symbol_table;

pub use namespace_tree::{NamespaceEdge, NamespaceMembers, NamespaceTree, ResolutionResult};
pub use petgraph::graph::NodeIndex;
pub use scope::{LocalScope, LocalScopeId, LocalScopeKind, ScopeRef};
pub use symbol::{
    Declaration, DeclarationNode, DecoratorId, Symbol, SymbolFlags, SymbolId, SymbolKind,
};
pub use symbol_table::{Declared, SymbolTable};
