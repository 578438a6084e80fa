//! Flow fractions through the routed network.

use rf_core::ComponentId;
use rf_graph::FlowGraph;

use crate::error::{ModelError, ModelResult};
use crate::model::Model;

impl Model {
    /// Fraction of the outflow of `from` that reaches `to`, composed through
    /// every routed path (mid pipes, separators, boosters).
    pub fn flow_fraction(&self, from: ComponentId, to: ComponentId) -> ModelResult<f64> {
        let graph = self.graph.as_ref().ok_or(ModelError::NotResolved)?;
        let len = self.components.len();
        for id in [from, to] {
            if id.slot() >= len {
                return Err(ModelError::IndexOob {
                    what: "component",
                    index: id.slot(),
                    len,
                });
            }
        }
        Ok(self.fraction_between(graph, from, to))
    }

    pub fn flow_fraction_by_name(&self, from: &str, to: &str) -> ModelResult<f64> {
        let from = self.require(from)?;
        let to = self.require(to)?;
        self.flow_fraction(from, to)
    }

    fn fraction_between(&self, graph: &FlowGraph, from: ComponentId, to: ComponentId) -> f64 {
        if from == to {
            return 1.0;
        }
        graph
            .downstream(from)
            .map(|edge| self.edge_share(edge.id) * self.fraction_between(graph, edge.to, to))
            .sum()
    }
}
