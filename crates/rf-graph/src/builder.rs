//! Incremental graph builder.

use rf_core::{ComponentId, EdgeId};

use crate::error::GraphResult;
use crate::graph::{Edge, FlowGraph, Node, NodeKind};
use crate::{order, validate};

/// Builder for constructing a flow network incrementally.
///
/// Use `add_node`/`add_terminal` and `connect` to build up the network,
/// then call `build()` to validate and freeze it into an immutable `FlowGraph`.
/// Node IDs are handed out in insertion order starting at 0, so callers can
/// mirror them with their own component indices.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a routing node and return its ID.
    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> ComponentId {
        self.push_node(name.into(), kind, false)
    }

    /// Add a terminal node (flow leaves the system here).
    pub fn add_terminal(&mut self, name: impl Into<String>, kind: NodeKind) -> ComponentId {
        self.push_node(name.into(), kind, true)
    }

    /// Connect `from` to `to`; `tag` is carried along untouched.
    pub fn connect(&mut self, from: ComponentId, to: ComponentId, tag: usize) -> EdgeId {
        let id = EdgeId::from_index(self.edges.len() as u32);
        self.edges.push(Edge { id, from, to, tag });
        id
    }

    /// Build and validate the graph, returning an immutable `FlowGraph`.
    pub fn build(self) -> GraphResult<FlowGraph> {
        validate::validate_structure(&self.nodes, &self.edges)?;

        let (out_offsets, out_edges) = Self::build_adjacency(&self.nodes, &self.edges, |e| e.from);
        let (in_offsets, in_edges) = Self::build_adjacency(&self.nodes, &self.edges, |e| e.to);

        let mut graph = FlowGraph {
            nodes: self.nodes,
            edges: self.edges,
            out_offsets,
            out_edges,
            in_offsets,
            in_edges,
            order: Vec::new(),
        };

        validate::validate_routing(&graph)?;
        graph.order = order::topological_order(&graph)?;

        Ok(graph)
    }

    fn push_node(&mut self, name: String, kind: NodeKind, terminal: bool) -> ComponentId {
        let id = ComponentId::from_index(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name,
            kind,
            terminal,
        });
        id
    }

    /// Build compact adjacency lists keyed by `key(edge)`, sorted by edge ID.
    fn build_adjacency(
        nodes: &[Node],
        edges: &[Edge],
        key: impl Fn(&Edge) -> ComponentId,
    ) -> (Vec<usize>, Vec<EdgeId>) {
        let mut buckets: Vec<Vec<EdgeId>> = vec![Vec::new(); nodes.len()];
        for edge in edges {
            if let Some(bucket) = buckets.get_mut(key(edge).slot()) {
                bucket.push(edge.id);
            }
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat = Vec::with_capacity(edges.len());
        offsets.push(0);
        for bucket in buckets {
            flat.extend(bucket);
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assigns_sequential_ids() {
        let mut builder = GraphBuilder::new();
        let w = builder.add_node("W1", NodeKind::Well);
        let p = builder.add_terminal("P1", NodeKind::Pipe);
        let e = builder.connect(w, p, 7);

        assert_eq!(w.index(), 0);
        assert_eq!(p.index(), 1);
        assert_eq!(e.index(), 0);
        assert_eq!(builder.nodes.len(), 2);
        assert_eq!(builder.edges[0].tag, 7);
    }

    #[test]
    fn builder_build_adjacency() {
        let mut builder = GraphBuilder::new();
        let w = builder.add_node("W1", NodeKind::Well);
        let p1 = builder.add_node("P1", NodeKind::Pipe);
        let p2 = builder.add_terminal("P2", NodeKind::Pipe);
        builder.connect(w, p1, 0);
        builder.connect(p1, p2, 1);

        let graph = builder.build().unwrap();
        assert_eq!(graph.downstream(w).count(), 1);
        assert_eq!(graph.upstream(w).count(), 0);
        assert_eq!(graph.upstream(p1).count(), 1);
        assert_eq!(graph.downstream(p2).count(), 0);
        assert_eq!(graph.upstream(p2).next().map(|e| e.tag), Some(1));
    }
}
