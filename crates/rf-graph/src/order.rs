//! Deterministic topological ordering (Kahn's algorithm).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rf_core::ComponentId;

use crate::error::{GraphError, GraphResult};
use crate::graph::FlowGraph;

/// Order nodes so that every node follows all of its upstream nodes.
///
/// Ties are broken by lowest ID, so the order is stable for a given network.
pub(crate) fn topological_order(graph: &FlowGraph) -> GraphResult<Vec<ComponentId>> {
    let n = graph.nodes().len();
    let mut indegree: Vec<usize> = graph
        .nodes()
        .iter()
        .map(|node| graph.upstream(node.id).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<ComponentId>> = graph
        .nodes()
        .iter()
        .filter(|node| indegree[node.id.slot()] == 0)
        .map(|node| Reverse(node.id))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(id)) = ready.pop() {
        order.push(id);
        for edge in graph.downstream(id) {
            let d = &mut indegree[edge.to.slot()];
            *d -= 1;
            if *d == 0 {
                ready.push(Reverse(edge.to));
            }
        }
    }

    if order.len() != n {
        // Any node left with unresolved inflow sits on a cycle.
        let stuck = graph
            .nodes()
            .iter()
            .find(|node| indegree[node.id.slot()] > 0)
            .map(|node| node.name.clone())
            .unwrap_or_default();
        return Err(GraphError::Cycle { node: stuck });
    }

    Ok(order)
}
