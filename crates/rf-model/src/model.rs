//! The model: components, variables, objective and state flags.

use std::collections::HashMap;

use rf_components::{
    BinaryVariable, Capacity, Component, ConId, Constraint, IntVariable, PressureMixing,
    RealVarId, RealVariable, Share, Stream, VariableStore, Well,
};
use rf_core::ComponentId;
use rf_graph::{FlowGraph, NodeKind};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::objective::{Objective, ObjectiveKind};

/// Tolerance used when reporting whether all constraints are satisfied.
pub const CONSTRAINT_TOL: f64 = 1e-6;

/// How non-well nodes obtain their inflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coupling {
    /// Inflow is the routed sum of upstream outflows.
    #[default]
    Coupled,
    /// Inflow rates are free variables, tied to upstream outflow by
    /// material-balance constraints.
    Decoupled,
}

/// Free input rates of one node in a decoupled model.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPoint {
    pub node: ComponentId,
    /// (oil, gas, water) per time step.
    pub rates: Vec<[RealVarId; 3]>,
    /// Material-balance constraints (oil, gas, water) per time step.
    pub balance: Vec<[ConId; 3]>,
}

/// A production network plus the optimization problem defined over it.
///
/// Two state machines live here: routing goes `Unresolved -> Resolved` once
/// in [`Model::initialize`], and the up-to-date flag toggles between stale and
/// fresh on every evaluation (initially stale).
#[derive(Debug)]
pub struct Model {
    pub(crate) name: String,
    pub(crate) coupling: Coupling,
    /// End time (days) of every time step.
    pub(crate) schedule: Vec<f64>,
    pub(crate) mixing: PressureMixing,
    pub(crate) max_input_rate: f64,
    pub(crate) components: Vec<Component>,
    pub(crate) index: HashMap<String, ComponentId>,
    pub(crate) capacities: Vec<Capacity>,
    pub(crate) vars: VariableStore,
    pub(crate) objective: Objective,
    pub(crate) graph: Option<FlowGraph>,
    /// Outlet share of every graph edge, indexed by edge slot.
    pub(crate) shares: Vec<Share>,
    pub(crate) input_points: Vec<InputPoint>,
    pub(crate) up_to_date: bool,
}

impl Model {
    pub fn new(
        name: impl Into<String>,
        coupling: Coupling,
        schedule: Vec<f64>,
        objective: ObjectiveKind,
    ) -> Self {
        Self {
            name: name.into(),
            coupling,
            schedule,
            mixing: PressureMixing::default(),
            max_input_rate: 1.0e8,
            components: Vec::new(),
            index: HashMap::new(),
            capacities: Vec::new(),
            vars: VariableStore::new(),
            objective: Objective::new(objective),
            graph: None,
            shares: Vec::new(),
            input_points: Vec::new(),
            up_to_date: false,
        }
    }

    pub fn with_mixing(mut self, mixing: PressureMixing) -> Self {
        self.mixing = mixing;
        self
    }

    /// Upper bound of the free input-rate variables of a decoupled model.
    pub fn with_max_input_rate(mut self, max: f64) -> Self {
        self.max_input_rate = max;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coupling(&self) -> Coupling {
        self.coupling
    }

    pub fn schedule(&self) -> &[f64] {
        &self.schedule
    }

    pub fn mixing(&self) -> PressureMixing {
        self.mixing
    }

    pub fn is_resolved(&self) -> bool {
        self.graph.is_some()
    }

    // ---- construction ----

    /// Id the next added component will receive.
    pub fn next_component_id(&self) -> ComponentId {
        ComponentId::from_index(self.components.len() as u32)
    }

    pub fn add_component(&mut self, component: Component) -> ModelResult<ComponentId> {
        if self.is_resolved() {
            return Err(ModelError::AlreadyResolved);
        }
        let name = component.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ModelError::DuplicateName { name });
        }
        let id = self.next_component_id();
        self.index.insert(name, id);
        self.components.push(component);
        Ok(id)
    }

    pub fn add_capacity(&mut self, capacity: Capacity) -> ModelResult<()> {
        if self.is_resolved() {
            return Err(ModelError::AlreadyResolved);
        }
        self.capacities.push(capacity);
        Ok(())
    }

    /// Declare decision variables while the model is being built.
    pub fn variables_mut(&mut self) -> ModelResult<&mut VariableStore> {
        if self.is_resolved() {
            return Err(ModelError::AlreadyResolved);
        }
        Ok(&mut self.vars)
    }

    // ---- components ----

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.slot())
    }

    pub fn component_by_name(&self, name: &str) -> Option<ComponentId> {
        self.index.get(name).copied()
    }

    pub(crate) fn require(&self, name: &str) -> ModelResult<ComponentId> {
        self.component_by_name(name)
            .ok_or_else(|| ModelError::UnknownComponent {
                name: name.to_string(),
            })
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.components.iter().filter(|c| c.kind() == kind).count()
    }

    pub fn wells(&self) -> impl Iterator<Item = (ComponentId, &Well)> + '_ {
        self.components.iter().enumerate().filter_map(|(i, c)| {
            c.as_well()
                .map(|w| (ComponentId::from_index(i as u32), w))
        })
    }

    pub fn capacities(&self) -> &[Capacity] {
        &self.capacities
    }

    pub fn graph(&self) -> Option<&FlowGraph> {
        self.graph.as_ref()
    }

    pub fn input_points(&self) -> &[InputPoint] {
        &self.input_points
    }

    /// Store streams reported by the reservoir simulator for a well.
    pub fn set_well_streams(&mut self, id: ComponentId, streams: Vec<Stream>) -> ModelResult<()> {
        let expected = self.schedule.len();
        let well = self
            .components
            .get_mut(id.slot())
            .and_then(Component::as_well_mut)
            .ok_or_else(|| ModelError::WrongKind {
                name: id.to_string(),
                expected: "well",
            })?;
        if streams.len() != expected {
            return Err(ModelError::TimeStepMismatch {
                component: well.name.clone(),
                expected,
                found: streams.len(),
            });
        }
        well.set_streams(streams);
        Ok(())
    }

    // ---- variables ----

    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }

    pub fn real_variables(&self) -> &[RealVariable] {
        self.vars.reals()
    }

    pub fn binary_variables(&self) -> &[BinaryVariable] {
        self.vars.binaries()
    }

    pub fn integer_variables(&self) -> &[IntVariable] {
        self.vars.integers()
    }

    pub fn constraints(&self) -> &[Constraint] {
        self.vars.constraints()
    }

    /// Set a real variable by position. A changed value marks the model stale.
    pub fn set_real_variable_value(&mut self, index: usize, value: f64) -> ModelResult<()> {
        let len = self.vars.reals().len();
        let old = self
            .vars
            .reals()
            .get(index)
            .map(|v| v.value)
            .ok_or(ModelError::IndexOob {
                what: "real variable",
                index,
                len,
            })?;
        self.vars.set_real_at(index, value);
        if old != value {
            self.up_to_date = false;
        }
        Ok(())
    }

    pub fn set_binary_variable_value(&mut self, index: usize, value: f64) -> ModelResult<()> {
        let len = self.vars.binaries().len();
        let old = self
            .vars
            .binaries()
            .get(index)
            .map(|v| v.value)
            .ok_or(ModelError::IndexOob {
                what: "binary variable",
                index,
                len,
            })?;
        self.vars.set_binary_at(index, value);
        if old != value {
            self.up_to_date = false;
        }
        Ok(())
    }

    pub fn set_integer_variable_value(&mut self, index: usize, value: i64) -> ModelResult<()> {
        let len = self.vars.integers().len();
        let old = self
            .vars
            .integers()
            .get(index)
            .map(|v| v.value)
            .ok_or(ModelError::IndexOob {
                what: "integer variable",
                index,
                len,
            })?;
        self.vars.set_integer_at(index, value);
        if old != value {
            self.up_to_date = false;
        }
        Ok(())
    }

    /// Positions of the real variables that drive the reservoir response of
    /// `well` (controls and gas lift).
    pub fn well_control_indices(&self, well: ComponentId) -> Vec<usize> {
        self.vars
            .real_indices_owned_by(well)
            .into_iter()
            .filter(|i| self.vars.reals()[*i].role.forces_reservoir_rerun())
            .collect()
    }

    // ---- objective and state ----

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn objective_value(&self) -> f64 {
        self.objective.value
    }

    /// Fold producer streams into the objective value.
    pub fn update_objective_value(&mut self) {
        let producers = self
            .components
            .iter()
            .filter_map(Component::as_well)
            .filter(|w| w.is_producer())
            .map(Well::streams);
        self.objective.value = self.objective.evaluate(&self.schedule, producers);
    }

    pub fn infeasibility(&self) -> f64 {
        self.vars.infeasibility()
    }

    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date
    }

    pub fn set_up_to_date(&mut self, fresh: bool) {
        self.up_to_date = fresh;
    }

    /// Network part of an evaluation: streams, pressures, constraints and
    /// objective. Returns whether all constraints are satisfied.
    pub fn evaluate_network(&mut self) -> ModelResult<bool> {
        self.update_streams()?;
        self.calculate_pipe_pressures()?;
        let satisfied = self.update_constraints()?;
        self.update_objective_value();
        Ok(satisfied)
    }
}
