//! Constraint recomputation.

use rf_components::{Component, ConId, EPSILON_RATE, Stream};
use rf_core::ComponentId;
use rf_graph::FlowGraph;
use tracing::warn;

use crate::error::{ModelError, ModelResult};
use crate::model::{CONSTRAINT_TOL, Model};

impl Model {
    /// Recompute every constraint from the current streams and pressures.
    ///
    /// Returns whether all constraints are satisfied. Structural
    /// inconsistencies (mismatched time-step counts, unknown targets) are
    /// errors rather than violations.
    pub fn update_constraints(&mut self) -> ModelResult<bool> {
        if !self.is_resolved() {
            return Err(ModelError::NotResolved);
        }

        for c in &self.components {
            match c {
                Component::Well(w) if w.is_producer() => {
                    w.update_routing_constraint(&mut self.vars);
                    let conn = w.dominant_connection(&self.vars)?;
                    let target_id = self.index.get(&conn.target).copied().ok_or_else(|| {
                        ModelError::UnknownTarget {
                            component: w.name.clone(),
                            target: conn.target.clone(),
                        }
                    })?;
                    let target = &self.components[target_id.slot()];
                    let worst =
                        w.update_bhp_constraints(&mut self.vars, target.name(), target.streams())?;
                    if worst < 0.0 {
                        warn!(
                            well = %w.name,
                            pipe = %target.name(),
                            value = worst,
                            "Bottomhole pressure constraint violated"
                        );
                    }
                }
                Component::Pipe(p) => p.update_routing_constraint(&mut self.vars),
                Component::Booster(b) => b.update_capacity_constraints(&mut self.vars)?,
                _ => {}
            }
        }

        for cap in &self.capacities {
            let feeds: Vec<&[Stream]> = cap
                .feeds
                .iter()
                .map(|id| self.components[id.slot()].streams())
                .collect();
            cap.update_constraints(&mut self.vars, &feeds)?;
        }

        for (con, value) in self.material_balance_values()? {
            self.vars.set_constraint_value(con, value);
        }

        Ok(self
            .vars
            .constraints()
            .iter()
            .all(|c| c.is_satisfied(CONSTRAINT_TOL)))
    }

    /// Declared input rate minus the well streams reaching the node, per
    /// (node, phase, time step). Each production well contributes its stream
    /// scaled by the composed flow fraction along every routed path;
    /// separators on the way keep only the water they let through.
    fn material_balance_values(&self) -> ModelResult<Vec<(ConId, f64)>> {
        let Some(graph) = self.graph.as_ref() else {
            return Err(ModelError::NotResolved);
        };
        let steps = self.schedule.len();
        let mut delivered = vec![vec![[0.0; 3]; steps]; self.components.len()];

        for (i, c) in self.components.iter().enumerate() {
            let Component::Well(w) = c else { continue };
            if !w.is_producer() {
                continue;
            }
            let streams = w.streams();
            if streams.len() != steps {
                return Err(ModelError::TimeStepMismatch {
                    component: w.name.clone(),
                    expected: steps,
                    found: streams.len(),
                });
            }
            let rates: Vec<[f64; 3]> = streams
                .iter()
                .map(|s| [s.oil_rate, s.gas_rate, s.water_rate])
                .collect();
            let well = ComponentId::from_index(i as u32);
            self.add_downstream(graph, well, &rates, &mut delivered);
        }

        let mut values = Vec::new();
        for point in &self.input_points {
            let reached = &delivered[point.node.slot()];
            for ((rates, cons), d) in point.rates.iter().zip(&point.balance).zip(reached) {
                for phase in 0..3 {
                    let declared = self.vars.real_value(rates[phase]);
                    values.push((cons[phase], declared - d[phase]));
                }
            }
        }
        Ok(values)
    }

    /// Push `rates` leaving `node` into every node below it.
    fn add_downstream(
        &self,
        graph: &FlowGraph,
        node: ComponentId,
        rates: &[[f64; 3]],
        delivered: &mut [Vec<[f64; 3]>],
    ) {
        let leaving = match &self.components[node.slot()] {
            Component::Separator(sep) => {
                let kept = water_kept(sep.streams(), &sep.outflow(&self.vars));
                rates
                    .iter()
                    .enumerate()
                    .map(|(k, r)| [r[0], r[1], r[2] * kept.get(k).copied().unwrap_or(1.0)])
                    .collect()
            }
            _ => rates.to_vec(),
        };

        for edge in graph.downstream(node) {
            let share = self.edge_share(edge.id);
            let scaled: Vec<[f64; 3]> = leaving.iter().map(|r| r.map(|q| q * share)).collect();
            for (d, r) in delivered[edge.to.slot()].iter_mut().zip(&scaled) {
                for (dq, rq) in d.iter_mut().zip(r) {
                    *dq += rq;
                }
            }
            self.add_downstream(graph, edge.to, &scaled, delivered);
        }
    }
}

/// Share of the inlet water a separator passes on, per time step.
fn water_kept(inlet: &[Stream], outlet: &[Stream]) -> Vec<f64> {
    inlet
        .iter()
        .zip(outlet)
        .map(|(i, o)| {
            if i.water_rate > EPSILON_RATE {
                o.water_rate / i.water_rate
            } else {
                1.0
            }
        })
        .collect()
}
