//! The namespace graph.
//!
//! Each namespace is a node of a `petgraph` digraph holding its reachable
//! members. `Child(name)` edges form the hierarchy; `Using` edges record
//! `using` statements.
//!
//! Member lookup never walks `Child` edges. A namespace that lost a name clash
//! keeps its node and edge, so its dotted path can still be printed, but it is
//! not in its parent's member table.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use crate::symbol::SymbolId;

/// Outcome of a lookup where `using` can make a name ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult<T> {
    Found(T),
    /// Distinct candidates, each paired with the used namespace it came from.
    Ambiguous(Vec<(NodeIndex, T)>),
    NotFound,
}

impl<T> ResolutionResult<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn ok(self) -> Option<T> {
        if let Self::Found(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEdge {
    /// Parent to child, labelled with the child's simple name.
    Child(String),
    Using,
}

/// Members of one namespace, merged across every `namespace` block naming it.
#[derive(Debug)]
pub struct NamespaceMembers {
    /// Symbol of the namespace itself.
    pub symbol: SymbolId,
    by_name: FxHashMap<String, SymbolId>,
    in_order: Vec<SymbolId>,
}

impl NamespaceMembers {
    pub fn new(symbol: SymbolId) -> Self {
        Self {
            symbol,
            by_name: FxHashMap::default(),
            in_order: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    /// First declaration wins; a clash returns the symbol holding the name.
    pub fn insert(&mut self, name: &str, symbol: SymbolId) -> Result<(), SymbolId> {
        match self.by_name.get(name) {
            Some(holder) => Err(*holder),
            None => {
                self.by_name.insert(name.to_string(), symbol);
                self.in_order.push(symbol);
                Ok(())
            }
        }
    }

    /// Reachable members in declaration order.
    pub fn members(&self) -> &[SymbolId] {
        &self.in_order
    }
}

#[derive(Debug)]
pub struct NamespaceTree {
    graph: DiGraph<NamespaceMembers, NamespaceEdge>,
    global: NodeIndex,
}

impl NamespaceTree {
    /// A tree holding only the global namespace, owned by `global_symbol`.
    pub fn new(global_symbol: SymbolId) -> Self {
        let mut graph = DiGraph::new();
        let global = graph.add_node(NamespaceMembers::new(global_symbol));
        Self { graph, global }
    }

    pub fn root(&self) -> NodeIndex {
        self.global
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn node(&self, node: NodeIndex) -> Option<&NamespaceMembers> {
        self.graph.node_weight(node)
    }

    pub fn node_mut(&mut self, node: NodeIndex) -> Option<&mut NamespaceMembers> {
        self.graph.node_weight_mut(node)
    }

    /// Always creates a fresh node; merging is decided by the caller.
    pub fn add_child(&mut self, parent: NodeIndex, name: &str, symbol: SymbolId) -> NodeIndex {
        let child = self.graph.add_node(NamespaceMembers::new(symbol));
        self.graph.add_edge(parent, child, NamespaceEdge::Child(name.to_string()));
        child
    }

    /// The incoming `Child` edge of `node`, as (parent, name).
    fn child_edge(&self, node: NodeIndex) -> Option<(NodeIndex, &str)> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .find_map(|edge| match edge.weight() {
                NamespaceEdge::Child(name) => Some((edge.source(), name.as_str())),
                NamespaceEdge::Using => None,
            })
    }

    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.child_edge(node).map(|(parent, _)| parent)
    }

    /// Simple name of `node`; `None` for the global namespace.
    pub fn name_of(&self, node: NodeIndex) -> Option<&str> {
        self.child_edge(node).map(|(_, name)| name)
    }

    /// Segments from the global namespace down to `node`.
    pub fn path(&self, node: NodeIndex) -> Vec<&str> {
        let mut segments = Vec::new();
        let mut current = node;
        while let Some((parent, name)) = self.child_edge(current) {
            segments.push(name);
            current = parent;
        }
        segments.reverse();
        segments
    }

    /// `A.B.name` for a member `name` of namespace `A.B`.
    pub fn qualified_name(&self, node: NodeIndex, name: &str) -> String {
        let mut segments = self.path(node);
        segments.push(name);
        segments.join(".")
    }

    /// Record `using target` inside `from`. Repeats are no-ops.
    pub fn add_using(&mut self, from: NodeIndex, target: NodeIndex) {
        let known = self
            .graph
            .edges_connecting(from, target)
            .any(|edge| *edge.weight() == NamespaceEdge::Using);
        if !known {
            self.graph.add_edge(from, target, NamespaceEdge::Using);
        }
    }

    /// Namespaces `node` uses, in the order the statements were bound.
    pub fn usings(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .filter(|edge| *edge.weight() == NamespaceEdge::Using)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_by_key(|(id, _)| id.index());
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Look `name` up among the members of namespaces used by `node` or any of
    /// its ancestors.
    ///
    /// Only direct members of a used namespace count; its own `using`
    /// statements are not followed. One symbol reached twice is one candidate.
    pub fn lookup_via_usings(
        &self,
        node: NodeIndex,
        name: &str,
        accept: impl Fn(SymbolId) -> bool,
    ) -> ResolutionResult<SymbolId> {
        let mut candidates: Vec<(NodeIndex, SymbolId)> = Vec::new();

        let mut scope = Some(node);
        while let Some(current) = scope {
            for used in self.usings(current) {
                let Some(symbol) = self.node(used).and_then(|members| members.get(name)) else {
                    continue;
                };
                if accept(symbol) && candidates.iter().all(|(_, seen)| *seen != symbol) {
                    candidates.push((used, symbol));
                }
            }
            scope = self.parent(current);
        }

        match candidates.as_slice() {
            [] => ResolutionResult::NotFound,
            [(_, only)] => ResolutionResult::Found(*only),
            _ => ResolutionResult::Ambiguous(candidates),
        }
    }
}
