//! Evaluation points and their batches.

use std::fmt;

use nalgebra::DVector;
use rf_core::error::{RfError, RfResult};
use rf_model::Model;
use serde::{Deserialize, Serialize};

/// Sensitivity of one output with respect to every real variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivative(pub DVector<f64>);

impl Derivative {
    pub fn new(values: Vec<f64>) -> Self {
        Self(DVector::from_vec(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn norm(&self) -> f64 {
        self.0.norm()
    }
}

/// Which parts of the source are copied into a new case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CopyMode {
    /// Variable values only; outputs start blank.
    #[default]
    Structural,
    /// Variable values plus constraint, objective and infeasibility values.
    Full,
}

fn out_of_bounds<T>(what: &'static str, index: usize, len: usize) -> RfResult<T> {
    Err(RfError::IndexOob { what, index, len })
}

/// One evaluation point: variable values in model order, plus the outputs
/// an evaluation writes back.
///
/// Variable vectors are index-aligned with the model's variable vectors;
/// the launcher checks the counts when the case is submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    real: Vec<f64>,
    binary: Vec<f64>,
    integer: Vec<i64>,
    constraints: Vec<f64>,
    objective: f64,
    infeasibility: f64,
    #[serde(skip)]
    constraint_derivatives: Vec<Derivative>,
    #[serde(skip)]
    objective_derivative: Option<Derivative>,
}

impl Case {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variables(real: Vec<f64>, binary: Vec<f64>, integer: Vec<i64>) -> Self {
        Self {
            real,
            binary,
            integer,
            ..Self::default()
        }
    }

    /// Snapshot of the model's current point.
    pub fn from_model(model: &Model, mode: CopyMode) -> Self {
        let mut case = Self::with_variables(
            model.real_variables().iter().map(|v| v.value).collect(),
            model.binary_variables().iter().map(|v| v.value).collect(),
            model.integer_variables().iter().map(|v| v.value).collect(),
        );
        if mode == CopyMode::Full {
            case.constraints = model.constraints().iter().map(|c| c.value).collect();
            case.objective = model.objective_value();
            case.infeasibility = model.infeasibility();
        }
        case
    }

    pub fn copy_of(other: &Case, mode: CopyMode) -> Self {
        match mode {
            CopyMode::Full => other.clone(),
            CopyMode::Structural => Self::with_variables(
                other.real.clone(),
                other.binary.clone(),
                other.integer.clone(),
            ),
        }
    }

    // ---- variables ----

    pub fn number_of_real_variables(&self) -> usize {
        self.real.len()
    }

    pub fn number_of_binary_variables(&self) -> usize {
        self.binary.len()
    }

    pub fn number_of_integer_variables(&self) -> usize {
        self.integer.len()
    }

    pub fn real_variables(&self) -> &[f64] {
        &self.real
    }

    pub fn binary_variables(&self) -> &[f64] {
        &self.binary
    }

    pub fn integer_variables(&self) -> &[i64] {
        &self.integer
    }

    pub fn add_real_variable_value(&mut self, value: f64) {
        self.real.push(value);
    }

    pub fn add_binary_variable_value(&mut self, value: f64) {
        self.binary.push(value);
    }

    pub fn add_integer_variable_value(&mut self, value: i64) {
        self.integer.push(value);
    }

    pub fn real_variable_value(&self, index: usize) -> RfResult<f64> {
        match self.real.get(index) {
            Some(v) => Ok(*v),
            None => out_of_bounds("real variable", index, self.real.len()),
        }
    }

    pub fn set_real_variable_value(&mut self, index: usize, value: f64) -> RfResult<()> {
        let len = self.real.len();
        match self.real.get_mut(index) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => out_of_bounds("real variable", index, len),
        }
    }

    pub fn binary_variable_value(&self, index: usize) -> RfResult<f64> {
        match self.binary.get(index) {
            Some(v) => Ok(*v),
            None => out_of_bounds("binary variable", index, self.binary.len()),
        }
    }

    pub fn set_binary_variable_value(&mut self, index: usize, value: f64) -> RfResult<()> {
        let len = self.binary.len();
        match self.binary.get_mut(index) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => out_of_bounds("binary variable", index, len),
        }
    }

    pub fn integer_variable_value(&self, index: usize) -> RfResult<i64> {
        match self.integer.get(index) {
            Some(v) => Ok(*v),
            None => out_of_bounds("integer variable", index, self.integer.len()),
        }
    }

    pub fn set_integer_variable_value(&mut self, index: usize, value: i64) -> RfResult<()> {
        let len = self.integer.len();
        match self.integer.get_mut(index) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => out_of_bounds("integer variable", index, len),
        }
    }

    // ---- outputs ----

    pub fn number_of_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> &[f64] {
        &self.constraints
    }

    pub fn add_constraint_value(&mut self, value: f64) {
        self.constraints.push(value);
    }

    pub fn constraint_value(&self, index: usize) -> RfResult<f64> {
        match self.constraints.get(index) {
            Some(v) => Ok(*v),
            None => out_of_bounds("constraint", index, self.constraints.len()),
        }
    }

    pub fn set_constraint_value(&mut self, index: usize, value: f64) -> RfResult<()> {
        let len = self.constraints.len();
        match self.constraints.get_mut(index) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => out_of_bounds("constraint", index, len),
        }
    }

    /// Drop all constraint values and their derivatives; variables stay.
    pub fn clear_constraints(&mut self) {
        self.constraints.clear();
        self.constraint_derivatives.clear();
    }

    pub fn objective_value(&self) -> f64 {
        self.objective
    }

    pub fn set_objective_value(&mut self, value: f64) {
        self.objective = value;
    }

    pub fn infeasibility(&self) -> f64 {
        self.infeasibility
    }

    pub fn set_infeasibility(&mut self, value: f64) {
        self.infeasibility = value;
    }

    pub fn objective_derivative(&self) -> Option<&Derivative> {
        self.objective_derivative.as_ref()
    }

    pub fn set_objective_derivative(&mut self, derivative: Derivative) {
        self.objective_derivative = Some(derivative);
    }

    pub fn add_constraint_derivative(&mut self, derivative: Derivative) {
        self.constraint_derivatives.push(derivative);
    }

    pub fn constraint_derivative(&self, index: usize) -> RfResult<&Derivative> {
        match self.constraint_derivatives.get(index) {
            Some(d) => Ok(d),
            None => out_of_bounds(
                "constraint derivative",
                index,
                self.constraint_derivatives.len(),
            ),
        }
    }

    pub fn number_of_constraint_derivatives(&self) -> usize {
        self.constraint_derivatives.len()
    }

    /// Multi-line rendering used in logs and reports.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CASE:")?;
        for (i, v) in self.real.iter().enumerate() {
            writeln!(f, "  VAR_C{}: {v}", i + 1)?;
        }
        for (i, v) in self.binary.iter().enumerate() {
            writeln!(f, "  VAR_B{}: {v}", i + 1)?;
        }
        for (i, v) in self.integer.iter().enumerate() {
            writeln!(f, "  VAR_I{}: {v}", i + 1)?;
        }
        for (i, v) in self.constraints.iter().enumerate() {
            writeln!(f, "  CON{}: {v}", i + 1)?;
        }
        writeln!(f, "  OBJ: {}", self.objective)?;
        write!(f, "  INFEASIBILITY: {}", self.infeasibility)
    }
}

/// The batch of cases one optimizer iteration sends for evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseQueue {
    cases: Vec<Case>,
}

impl CaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, case: Case) {
        self.cases.push(case);
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Case> {
        self.cases.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Case> {
        self.cases.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Case> {
        self.cases.iter_mut()
    }

    pub fn into_cases(self) -> Vec<Case> {
        self.cases
    }
}

impl From<Vec<Case>> for CaseQueue {
    fn from(cases: Vec<Case>) -> Self {
        Self { cases }
    }
}

impl IntoIterator for CaseQueue {
    type Item = Case;
    type IntoIter = std::vec::IntoIter<Case>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.into_iter()
    }
}
