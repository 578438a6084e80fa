//! Stream propagation (downstream) and pressure calculation (upstream).

use rf_components::{Component, PipeOutlet, Stream};
use rf_core::ComponentId;
use rf_graph::FlowGraph;
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::model::{Coupling, Model};

/// Shares at or below this are treated as closed connections.
const CLOSED_SHARE: f64 = 1e-12;

impl Model {
    fn resolved_graph(&self) -> ModelResult<&FlowGraph> {
        self.graph.as_ref().ok_or(ModelError::NotResolved)
    }

    fn check_steps(&self, component: &Component, found: usize) -> ModelResult<()> {
        let expected = self.schedule.len();
        if found != expected {
            return Err(ModelError::TimeStepMismatch {
                component: component.name().to_string(),
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Propagate streams from the wells to every downstream node.
    ///
    /// Coupled models visit nodes in topological order so every node sees the
    /// final outflow of all its upstream contributors. Decoupled models take
    /// each node's inflow from its free input-rate variables.
    pub fn update_streams(&mut self) -> ModelResult<()> {
        let graph = self.resolved_graph()?;

        for c in &self.components {
            if let Component::Well(w) = c {
                if w.is_producer() {
                    self.check_steps(c, w.streams().len())?;
                }
            }
        }

        match self.coupling {
            Coupling::Coupled => {
                let mut updates = Vec::new();
                let mut outflows: Vec<Option<Vec<Stream>>> = vec![None; self.components.len()];
                for id in graph.order() {
                    let node = &self.components[id.slot()];
                    if matches!(node, Component::Well(_)) {
                        outflows[id.slot()] = Some(node.outflow(&self.vars));
                        continue;
                    }

                    let mut merged: Vec<Stream> =
                        self.schedule.iter().map(|t| Stream::at(*t)).collect();
                    for edge in graph.upstream(*id) {
                        let share = self.edge_share(edge.id);
                        let upstream = outflows[edge.from.slot()].as_deref().unwrap_or(&[]);
                        self.check_steps(&self.components[edge.from.slot()], upstream.len())?;
                        for (m, s) in merged.iter_mut().zip(upstream) {
                            *m = m.merge(&(*s * share), self.mixing);
                        }
                    }

                    // Outflow depends on the node's own new inflow (separators).
                    let outflow = match node {
                        Component::Separator(sep) => {
                            let mut sep = sep.clone();
                            sep.set_streams(merged.clone());
                            sep.outflow(&self.vars)
                        }
                        _ => merged.clone(),
                    };
                    outflows[id.slot()] = Some(outflow);
                    updates.push((*id, merged));
                }
                for (id, streams) in updates {
                    self.components[id.slot()].set_streams(streams);
                }
            }
            Coupling::Decoupled => {
                let mut updates = Vec::with_capacity(self.input_points.len());
                for point in &self.input_points {
                    let streams = point
                        .rates
                        .iter()
                        .zip(&self.schedule)
                        .map(|([qo, qg, qw], t)| {
                            Stream::new(
                                *t,
                                self.vars.real_value(*qo),
                                self.vars.real_value(*qg),
                                self.vars.real_value(*qw),
                                0.0,
                            )
                        })
                        .collect::<Vec<_>>();
                    updates.push((point.node, streams));
                }
                for (id, streams) in updates {
                    self.components[id.slot()].set_streams(streams);
                }
            }
        }

        debug!(model = %self.name, "Streams updated");
        Ok(())
    }

    /// Inlet pressure of every node, computed upstream from the boundaries.
    ///
    /// End pipes start from their boundary pressure. A mid pipe delivers
    /// against the highest inlet pressure among its open outlets. Separators
    /// pass pressure through; installed boosters subtract their boost.
    pub fn calculate_pipe_pressures(&mut self) -> ModelResult<()> {
        let order: Vec<ComponentId> = self.resolved_graph()?.reverse_order().collect();
        let steps = self.schedule.len();

        for id in order {
            let node = &self.components[id.slot()];
            match node {
                Component::Well(_) => {}
                Component::Pipe(pipe) => {
                    let outlet = match &pipe.outlet {
                        PipeOutlet::Boundary { pressure } => vec![*pressure; steps],
                        PipeOutlet::Routed(_) => self.downstream_pressures(id)?,
                    };
                    self.check_steps(node, node.streams().len())?;
                    if let Component::Pipe(pipe) = &mut self.components[id.slot()] {
                        pipe.calculate_inlet_pressures(&outlet)?;
                    }
                }
                Component::Separator(_) => {
                    let outlet = self.downstream_pressures(id)?;
                    self.apply_pressures(id, &outlet)?;
                }
                Component::Booster(booster) => {
                    let inlet: Vec<f64> = self
                        .downstream_pressures(id)?
                        .into_iter()
                        .map(|p| booster.inlet_pressure(p, &self.vars))
                        .collect();
                    self.apply_pressures(id, &inlet)?;
                }
            }
        }
        Ok(())
    }

    /// Per time step, the highest inlet pressure of the open downstream
    /// targets of `id` (all targets when every outlet is closed).
    fn downstream_pressures(&self, id: ComponentId) -> ModelResult<Vec<f64>> {
        let graph = self.resolved_graph()?;
        let edges: Vec<_> = graph.downstream(id).collect();
        let open: Vec<_> = edges
            .iter()
            .filter(|e| self.edge_share(e.id) > CLOSED_SHARE)
            .collect();
        let active = if open.is_empty() {
            edges.iter().collect()
        } else {
            open
        };

        let mut pressures = vec![f64::NEG_INFINITY; self.schedule.len()];
        for edge in active {
            let target = &self.components[edge.to.slot()];
            self.check_steps(target, target.streams().len())?;
            for (p, s) in pressures.iter_mut().zip(target.streams()) {
                *p = p.max(s.pressure);
            }
        }
        Ok(pressures)
    }

    fn apply_pressures(&mut self, id: ComponentId, pressures: &[f64]) -> ModelResult<()> {
        let node = &self.components[id.slot()];
        self.check_steps(node, node.streams().len())?;
        let mut streams = node.streams().to_vec();
        for (s, p) in streams.iter_mut().zip(pressures) {
            s.pressure = *p;
        }
        self.components[id.slot()].set_streams(streams);
        Ok(())
    }
}
