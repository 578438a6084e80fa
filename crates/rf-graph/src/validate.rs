//! Topology validation logic.

use std::collections::HashSet;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Edge, FlowGraph, Node, NodeKind};

/// Validate references: every edge names existing, distinct nodes, no pair is
/// connected twice, and wells are never downstream ends.
pub(crate) fn validate_structure(nodes: &[Node], edges: &[Edge]) -> GraphResult<()> {
    let mut pairs = HashSet::new();

    for edge in edges {
        for node in [edge.from, edge.to] {
            if node.slot() >= nodes.len() {
                return Err(GraphError::InvalidNodeRef {
                    edge: edge.id,
                    node,
                });
            }
        }

        let from = &nodes[edge.from.slot()];
        let to = &nodes[edge.to.slot()];

        if edge.from == edge.to {
            return Err(GraphError::SelfLoop {
                node: from.name.clone(),
            });
        }

        if to.kind == NodeKind::Well {
            return Err(GraphError::WellAsTarget {
                well: to.name.clone(),
            });
        }

        if !pairs.insert((edge.from, edge.to)) {
            return Err(GraphError::DuplicateEdge {
                from: from.name.clone(),
                to: to.name.clone(),
            });
        }
    }

    Ok(())
}

/// Validate outlets: terminals have none, everything else has a downstream
/// path, and separators/boosters have exactly one.
pub(crate) fn validate_routing(graph: &FlowGraph) -> GraphResult<()> {
    for node in graph.nodes() {
        let outlets = graph.downstream(node.id).count();

        if node.terminal {
            if outlets > 0 {
                return Err(GraphError::TerminalWithOutlet {
                    node: node.name.clone(),
                });
            }
            continue;
        }

        if outlets == 0 {
            return Err(GraphError::MissingDownstream {
                node: node.name.clone(),
            });
        }

        if node.kind.single_outlet() && outlets != 1 {
            return Err(GraphError::MultipleOutlets {
                node: node.name.clone(),
                count: outlets,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{GraphBuilder, GraphError, NodeKind};

    #[test]
    fn rejects_self_loop() {
        let mut b = GraphBuilder::new();
        let p = b.add_node("P1", NodeKind::Pipe);
        b.connect(p, p, 0);
        assert!(matches!(b.build(), Err(GraphError::SelfLoop { .. })));
    }

    #[test]
    fn rejects_flow_into_well() {
        let mut b = GraphBuilder::new();
        let p = b.add_node("P1", NodeKind::Pipe);
        let w = b.add_node("W1", NodeKind::Well);
        b.connect(p, w, 0);
        assert!(matches!(b.build(), Err(GraphError::WellAsTarget { .. })));
    }

    #[test]
    fn rejects_missing_downstream() {
        let mut b = GraphBuilder::new();
        let w = b.add_node("W1", NodeKind::Well);
        let p = b.add_node("P1", NodeKind::Pipe);
        b.connect(w, p, 0);
        let err = b.build().unwrap_err();
        assert_eq!(
            err,
            GraphError::MissingDownstream {
                node: "P1".to_string()
            }
        );
    }

    #[test]
    fn rejects_separator_with_two_outlets() {
        let mut b = GraphBuilder::new();
        let s = b.add_node("S1", NodeKind::Separator);
        let p1 = b.add_terminal("P1", NodeKind::Pipe);
        let p2 = b.add_terminal("P2", NodeKind::Pipe);
        b.connect(s, p1, 0);
        b.connect(s, p2, 1);
        assert!(matches!(
            b.build(),
            Err(GraphError::MultipleOutlets { count: 2, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_connection() {
        let mut b = GraphBuilder::new();
        let w = b.add_node("W1", NodeKind::Well);
        let p = b.add_terminal("P1", NodeKind::Pipe);
        b.connect(w, p, 0);
        b.connect(w, p, 1);
        assert!(matches!(b.build(), Err(GraphError::DuplicateEdge { .. })));
    }
}
