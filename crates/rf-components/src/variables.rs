//! Decision variables, constraints and the arena that owns them.

use rf_core::{ComponentId, bound_violation};

/// The part a variable plays in the model.
///
/// Replaces a back-pointer from variable to owning component: anything the
/// evaluation loop needs to know about a variable's owner is encoded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarRole {
    /// Well rate or pressure target for one control interval.
    WellControl,
    /// Gas-lift injection rate for one control interval.
    GasLift,
    /// Fraction of a node's outflow sent along one connection.
    Routing,
    /// Declared input rate of a node (decoupled models only).
    InputRate,
    /// Installation decision for a separator or booster.
    Install,
    /// Fraction of water a separator removes.
    SeparatorRemoval,
    /// Capacity of a pressure booster.
    BoosterCapacity,
    /// Pressure added by a pressure booster.
    BoostPressure,
}

impl VarRole {
    /// Whether changing a variable with this role changes subsurface behaviour.
    pub fn forces_reservoir_rerun(self) -> bool {
        matches!(self, VarRole::WellControl | VarRole::GasLift)
    }
}

/// What a constraint measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `(p_wf - p_pipe) / p_wf` for one time step; negative when violated.
    BottomholePressure,
    /// Sum of a well's connection fractions.
    WellRouting,
    /// Sum of a pipe's outlet fractions.
    PipeRouting,
    /// Declared minus delivered rate for one phase and time step.
    MaterialBalance,
    /// `(max - q) / max` for a capacity group; negative when violated.
    Capacity,
    /// `(capacity - q_liquid) / capacity` for a booster.
    BoosterCapacity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealVariable {
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub owner: Option<ComponentId>,
    pub role: VarRole,
}

impl RealVariable {
    pub fn new(name: impl Into<String>, value: f64, min: f64, max: f64, role: VarRole) -> Self {
        Self {
            name: name.into(),
            value,
            min,
            max,
            owner: None,
            role,
        }
    }

    pub fn owned_by(mut self, owner: ComponentId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn in_bounds(&self) -> bool {
        self.value >= self.min && self.value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryVariable {
    pub name: String,
    pub value: f64,
    pub owner: Option<ComponentId>,
    pub role: VarRole,
}

impl BinaryVariable {
    pub fn new(name: impl Into<String>, value: f64, role: VarRole) -> Self {
        Self {
            name: name.into(),
            value,
            owner: None,
            role,
        }
    }

    pub fn owned_by(mut self, owner: ComponentId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn min(&self) -> f64 {
        0.0
    }

    pub fn max(&self) -> f64 {
        1.0
    }

    pub fn is_on(&self) -> bool {
        self.value >= 0.5
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntVariable {
    pub name: String,
    pub value: i64,
    pub min: i64,
    pub max: i64,
    pub owner: Option<ComponentId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub owner: Option<ComponentId>,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn new(name: impl Into<String>, min: f64, max: f64, kind: ConstraintKind) -> Self {
        Self {
            name: name.into(),
            value: 0.0,
            min,
            max,
            owner: None,
            kind,
        }
    }

    pub fn owned_by(mut self, owner: ComponentId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Distance of the current value outside `[min, max]`.
    pub fn violation(&self) -> f64 {
        bound_violation(self.value, self.min, self.max)
    }

    pub fn is_satisfied(&self, tol: f64) -> bool {
        self.violation() <= tol
    }
}

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            /// Position in the model-wide vector of this kind.
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Handle to a real variable in a `VariableStore`.
    RealVarId
);
arena_id!(
    /// Handle to a binary variable in a `VariableStore`.
    BinVarId
);
arena_id!(
    /// Handle to an integer variable in a `VariableStore`.
    IntVarId
);
arena_id!(
    /// Handle to a constraint in a `VariableStore`.
    ConId
);

/// Owner of every variable and constraint in a model.
///
/// Handles are only minted by `add_*`, so indexing with them stays in bounds
/// for the store that created them. The order of each vector is the order the
/// optimizer sees.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    real: Vec<RealVariable>,
    binary: Vec<BinaryVariable>,
    integer: Vec<IntVariable>,
    constraints: Vec<Constraint>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_real(&mut self, var: RealVariable) -> RealVarId {
        self.real.push(var);
        RealVarId(self.real.len() - 1)
    }

    pub fn add_binary(&mut self, var: BinaryVariable) -> BinVarId {
        self.binary.push(var);
        BinVarId(self.binary.len() - 1)
    }

    pub fn add_integer(&mut self, var: IntVariable) -> IntVarId {
        self.integer.push(var);
        IntVarId(self.integer.len() - 1)
    }

    pub fn add_constraint(&mut self, con: Constraint) -> ConId {
        self.constraints.push(con);
        ConId(self.constraints.len() - 1)
    }

    pub fn reals(&self) -> &[RealVariable] {
        &self.real
    }

    pub fn binaries(&self) -> &[BinaryVariable] {
        &self.binary
    }

    pub fn integers(&self) -> &[IntVariable] {
        &self.integer
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn real(&self, id: RealVarId) -> &RealVariable {
        &self.real[id.0]
    }

    pub fn real_value(&self, id: RealVarId) -> f64 {
        self.real[id.0].value
    }

    pub fn binary(&self, id: BinVarId) -> &BinaryVariable {
        &self.binary[id.0]
    }

    pub fn binary_value(&self, id: BinVarId) -> f64 {
        self.binary[id.0].value
    }

    pub fn constraint(&self, id: ConId) -> &Constraint {
        &self.constraints[id.0]
    }

    /// Set by position; returns false when `index` is out of range.
    pub fn set_real_at(&mut self, index: usize, value: f64) -> bool {
        match self.real.get_mut(index) {
            Some(v) => {
                v.value = value;
                true
            }
            None => false,
        }
    }

    /// Set by position; returns false when `index` is out of range.
    pub fn set_binary_at(&mut self, index: usize, value: f64) -> bool {
        match self.binary.get_mut(index) {
            Some(v) => {
                v.value = value;
                true
            }
            None => false,
        }
    }

    /// Set by position; returns false when `index` is out of range.
    pub fn set_integer_at(&mut self, index: usize, value: i64) -> bool {
        match self.integer.get_mut(index) {
            Some(v) => {
                v.value = value;
                true
            }
            None => false,
        }
    }

    pub fn set_constraint_value(&mut self, id: ConId, value: f64) {
        self.constraints[id.0].value = value;
    }

    /// Sum of all constraint violations.
    pub fn infeasibility(&self) -> f64 {
        self.constraints.iter().map(Constraint::violation).sum()
    }

    /// Positions of the real variables owned by `owner`, in store order.
    pub fn real_indices_owned_by(&self, owner: ComponentId) -> Vec<usize> {
        self.real
            .iter()
            .enumerate()
            .filter(|(_, v)| v.owner == Some(owner))
            .map(|(i, _)| i)
            .collect()
    }
}
