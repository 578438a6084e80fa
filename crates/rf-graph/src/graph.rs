//! Core graph data structures.

use rf_core::{ComponentId, EdgeId};

/// What kind of network element a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Flow source; never receives flow.
    Well,
    /// Pipe segment, either routing onward or ending at a boundary.
    Pipe,
    /// Separator with exactly one outlet pipe.
    Separator,
    /// Pressure booster with exactly one outlet pipe.
    Booster,
}

impl NodeKind {
    /// Nodes that must route into exactly one downstream node.
    pub fn single_outlet(self) -> bool {
        matches!(self, NodeKind::Separator | NodeKind::Booster)
    }
}

/// A node of the flow network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: ComponentId,
    pub name: String,
    pub kind: NodeKind,
    /// Terminal nodes (end pipes) leave the system and have no outlets.
    pub terminal: bool,
}

/// A directed connection carrying a share of the upstream node's flow.
///
/// `tag` is an opaque payload owned by the caller (typically the index of the
/// fraction variable that scales the flow along this edge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: ComponentId,
    pub to: ComponentId,
    pub tag: usize,
}

/// A validated, immutable flow network.
///
/// Adjacency is stored compactly in both directions:
/// node i's outgoing edges are `out_edges[out_offsets[i]..out_offsets[i+1]]`,
/// and likewise for incoming edges.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) out_offsets: Vec<usize>,
    pub(crate) out_edges: Vec<EdgeId>,
    pub(crate) in_offsets: Vec<usize>,
    pub(crate) in_edges: Vec<EdgeId>,
    /// Upstream-before-downstream order over all nodes.
    pub(crate) order: Vec<ComponentId>,
}

impl FlowGraph {
    /// Return all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return all edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: ComponentId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    /// Get an edge by ID (returns None if ID out of bounds).
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.slot())
    }

    /// Outgoing edges of a node.
    pub fn downstream(&self, id: ComponentId) -> impl Iterator<Item = &Edge> + '_ {
        Self::slice(&self.out_offsets, &self.out_edges, id)
            .iter()
            .filter_map(|e| self.edge(*e))
    }

    /// Incoming edges of a node.
    pub fn upstream(&self, id: ComponentId) -> impl Iterator<Item = &Edge> + '_ {
        Self::slice(&self.in_offsets, &self.in_edges, id)
            .iter()
            .filter_map(|e| self.edge(*e))
    }

    /// Topological order: no node appears before any of its upstream nodes.
    pub fn order(&self) -> &[ComponentId] {
        &self.order
    }

    /// Reverse topological order: every node appears before its upstream nodes.
    pub fn reverse_order(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.order.iter().rev().copied()
    }

    /// Whether `to` can be reached from `from` by following connections.
    pub fn reaches(&self, from: ComponentId, to: ComponentId) -> bool {
        if from == to {
            return true;
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(n) = stack.pop() {
            for edge in self.downstream(n) {
                if edge.to == to {
                    return true;
                }
                if let Some(flag) = seen.get_mut(edge.to.slot())
                    && !*flag
                {
                    *flag = true;
                    stack.push(edge.to);
                }
            }
        }
        false
    }

    fn slice<'a>(offsets: &[usize], flat: &'a [EdgeId], id: ComponentId) -> &'a [EdgeId] {
        let idx = id.slot();
        if idx + 1 >= offsets.len() {
            return &[];
        }
        &flat[offsets[idx]..offsets[idx + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_outlet_kinds() {
        assert!(NodeKind::Separator.single_outlet());
        assert!(NodeKind::Booster.single_outlet());
        assert!(!NodeKind::Pipe.single_outlet());
        assert!(!NodeKind::Well.single_outlet());
    }
}
