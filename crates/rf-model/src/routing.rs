//! One-time resolution of the declared topology into a flow graph, plus the
//! constraints that hang off it.

use rf_components::{
    Component, Constraint, ConstraintKind, RealVariable, Share, VarRole,
};
use rf_core::ComponentId;
use rf_graph::GraphBuilder;
use tracing::{debug, info};

use crate::error::{ModelError, ModelResult};
use crate::model::{Coupling, InputPoint, Model};

const PHASES: [&str; 3] = ["oil", "gas", "water"];

impl Model {
    /// Resolve routing and capacities, then create every constraint (and the
    /// free input rates of a decoupled model).
    ///
    /// This is a one-way transition: calling it again returns
    /// [`ModelError::AlreadyResolved`].
    pub fn initialize(&mut self) -> ModelResult<()> {
        if self.is_resolved() {
            return Err(ModelError::AlreadyResolved);
        }
        self.validate_schedule()?;
        self.resolve_capacity_connections()?;
        self.resolve_pipe_routing()?;
        self.create_constraints();
        if self.coupling == Coupling::Decoupled {
            self.create_input_points();
        }
        self.up_to_date = false;

        info!(
            model = %self.name,
            components = self.components.len(),
            real_vars = self.vars.reals().len(),
            binary_vars = self.vars.binaries().len(),
            constraints = self.vars.constraints().len(),
            "Model initialized"
        );
        Ok(())
    }

    fn validate_schedule(&self) -> ModelResult<()> {
        if self.schedule.is_empty() {
            return Err(ModelError::InvalidSchedule {
                what: "schedule has no time steps".to_string(),
            });
        }
        let mut previous = 0.0;
        for t in &self.schedule {
            if !t.is_finite() || *t <= previous {
                return Err(ModelError::InvalidSchedule {
                    what: format!("time {t} does not increase after {previous}"),
                });
            }
            previous = *t;
        }
        Ok(())
    }

    /// Resolve the feed pipe names of every capacity group.
    pub(crate) fn resolve_capacity_connections(&mut self) -> ModelResult<()> {
        for cap in &mut self.capacities {
            let mut feeds = Vec::with_capacity(cap.feed_names.len());
            for feed in &cap.feed_names {
                let id = self
                    .index
                    .get(feed)
                    .copied()
                    .ok_or_else(|| ModelError::UnknownTarget {
                        component: cap.name.clone(),
                        target: feed.clone(),
                    })?;
                if !matches!(self.components[id.slot()], Component::Pipe(_)) {
                    return Err(ModelError::WrongKind {
                        name: feed.clone(),
                        expected: "pipe",
                    });
                }
                feeds.push(id);
            }
            debug!(capacity = %cap.name, feeds = feeds.len(), "Resolved capacity feeds");
            cap.feeds = feeds;
        }
        Ok(())
    }

    /// Build the flow graph from the declared connections. Graph node ids
    /// mirror component ids; each edge remembers the share of its outlet.
    pub(crate) fn resolve_pipe_routing(&mut self) -> ModelResult<()> {
        let mut builder = GraphBuilder::new();
        for c in &self.components {
            if c.is_terminal() || !c.in_network() {
                builder.add_terminal(c.name(), c.kind());
            } else {
                builder.add_node(c.name(), c.kind());
            }
        }

        let mut shares = Vec::new();
        for (i, c) in self.components.iter().enumerate() {
            let from = ComponentId::from_index(i as u32);
            for (tag, outlet) in c.outlets().iter().enumerate() {
                let to = self.index.get(outlet.target).copied().ok_or_else(|| {
                    ModelError::UnknownTarget {
                        component: c.name().to_string(),
                        target: outlet.target.to_string(),
                    }
                })?;
                builder.connect(from, to, tag);
                shares.push(outlet.share);
            }
        }

        let graph = builder.build()?;
        info!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            "Resolved pipe routing"
        );
        self.shares = shares;
        self.graph = Some(graph);
        Ok(())
    }

    fn create_constraints(&mut self) {
        let steps = self.schedule.len();
        for (i, c) in self.components.iter_mut().enumerate() {
            let id = ComponentId::from_index(i as u32);
            match c {
                Component::Well(w) if w.is_producer() => {
                    w.routing_constraint = Some(self.vars.add_constraint(
                        Constraint::new(
                            format!("{}_routing", w.name),
                            1.0,
                            1.0,
                            ConstraintKind::WellRouting,
                        )
                        .owned_by(id),
                    ));
                    w.bhp_constraints = (0..steps)
                        .map(|k| {
                            self.vars.add_constraint(
                                Constraint::new(
                                    format!("{}_bhp_{k}", w.name),
                                    0.0,
                                    1.0,
                                    ConstraintKind::BottomholePressure,
                                )
                                .owned_by(id),
                            )
                        })
                        .collect();
                }
                Component::Pipe(p) if !p.is_end_pipe() => {
                    p.routing_constraint = Some(self.vars.add_constraint(
                        Constraint::new(
                            format!("{}_routing", p.name),
                            1.0,
                            1.0,
                            ConstraintKind::PipeRouting,
                        )
                        .owned_by(id),
                    ));
                }
                Component::Booster(b) => {
                    b.capacity_constraints = (0..steps)
                        .map(|k| {
                            self.vars.add_constraint(
                                Constraint::new(
                                    format!("{}_capacity_{k}", b.name),
                                    0.0,
                                    1.0,
                                    ConstraintKind::BoosterCapacity,
                                )
                                .owned_by(id),
                            )
                        })
                        .collect();
                }
                _ => {}
            }
        }

        for cap in &mut self.capacities {
            for limit in &mut cap.limits {
                limit.constraints = (0..steps)
                    .map(|k| {
                        self.vars.add_constraint(Constraint::new(
                            format!("{}_{}_{k}", cap.name, limit.phase.as_str()),
                            0.0,
                            1.0,
                            ConstraintKind::Capacity,
                        ))
                    })
                    .collect();
            }
        }
    }

    /// Free input rates and material-balance constraints for every node that
    /// receives flow.
    fn create_input_points(&mut self) {
        let steps = self.schedule.len();
        let mut points = Vec::new();
        for (i, c) in self.components.iter().enumerate() {
            if matches!(c, Component::Well(_)) {
                continue;
            }
            let node = ComponentId::from_index(i as u32);
            let name = c.name();
            let mut rates = Vec::with_capacity(steps);
            let mut balance = Vec::with_capacity(steps);
            for k in 0..steps {
                rates.push(PHASES.map(|phase| {
                    self.vars.add_real(
                        RealVariable::new(
                            format!("{name}_q{phase}_{k}"),
                            0.0,
                            0.0,
                            self.max_input_rate,
                            VarRole::InputRate,
                        )
                        .owned_by(node),
                    )
                }));
                balance.push(PHASES.map(|phase| {
                    self.vars.add_constraint(
                        Constraint::new(
                            format!("{name}_mb_{phase}_{k}"),
                            0.0,
                            0.0,
                            ConstraintKind::MaterialBalance,
                        )
                        .owned_by(node),
                    )
                }));
            }
            points.push(InputPoint {
                node,
                rates,
                balance,
            });
        }
        debug!(points = points.len(), "Created decoupled input points");
        self.input_points = points;
    }

    /// Share of the outflow of `from` sent along graph edge `edge`.
    pub(crate) fn edge_share(&self, edge: rf_core::EdgeId) -> f64 {
        self.shares
            .get(edge.slot())
            .copied()
            .unwrap_or(Share::Full)
            .value(&self.vars)
    }
}

#[cfg(test)]
mod tests {
    use rf_components::{
        Pipe, PipeConnection, PipeOutlet, QuadraticDrop, RealVariable, VarRole, Well, WellKind,
    };

    use super::*;
    use crate::objective::ObjectiveKind;

    fn small_model(coupling: Coupling) -> Model {
        let mut model = Model::new("m", coupling, vec![30.0, 60.0], ObjectiveKind::CumulativeOil);
        let well_id = model.next_component_id();
        let frac = model
            .variables_mut()
            .unwrap()
            .add_real(
                RealVariable::new("W1_P1", 1.0, 0.0, 1.0, VarRole::Routing).owned_by(well_id),
            );
        let mut well = Well::new("W1", WellKind::Production);
        well.connections.push(PipeConnection {
            target: "P1".into(),
            fraction: frac,
        });
        model.add_component(Component::Well(well)).unwrap();
        model
            .add_component(Component::Pipe(Pipe::new(
                "P1",
                PipeOutlet::Boundary { pressure: 10.0 },
                Box::new(QuadraticDrop::new(0.0, 0.0, 0.0)),
            )))
            .unwrap();
        model
    }

    #[test]
    fn initialize_is_one_way() {
        let mut model = small_model(Coupling::Coupled);
        model.initialize().unwrap();
        assert!(model.is_resolved());
        assert!(matches!(model.initialize(), Err(ModelError::AlreadyResolved)));
        assert!(matches!(
            model.variables_mut(),
            Err(ModelError::AlreadyResolved)
        ));
        // routing + two BHP constraints
        assert_eq!(model.constraints().len(), 3);
    }

    #[test]
    fn unknown_target_is_fatal() {
        let mut model = Model::new("m", Coupling::Coupled, vec![1.0], ObjectiveKind::CumulativeOil);
        let frac = model
            .variables_mut()
            .unwrap()
            .add_real(RealVariable::new("f", 1.0, 0.0, 1.0, VarRole::Routing));
        let mut well = Well::new("W1", WellKind::Production);
        well.connections.push(PipeConnection {
            target: "NOWHERE".into(),
            fraction: frac,
        });
        model.add_component(Component::Well(well)).unwrap();
        assert!(matches!(
            model.initialize(),
            Err(ModelError::UnknownTarget { .. })
        ));
        assert!(!model.is_resolved());
    }

    #[test]
    fn decoupled_model_gets_input_points() {
        let mut model = small_model(Coupling::Decoupled);
        model.initialize().unwrap();
        assert_eq!(model.input_points().len(), 1);
        let point = &model.input_points()[0];
        assert_eq!(point.rates.len(), 2);
        // 1 routing var + 3 phases x 2 steps
        assert_eq!(model.real_variables().len(), 7);
        assert_eq!(model.constraints().len(), 3 + 6);
    }

    #[test]
    fn schedule_must_increase() {
        let mut model = Model::new(
            "m",
            Coupling::Coupled,
            vec![30.0, 30.0],
            ObjectiveKind::CumulativeOil,
        );
        assert!(matches!(
            model.initialize(),
            Err(ModelError::InvalidSchedule { .. })
        ));
    }
}
