//! Result data types.

use serde::{Deserialize, Deserializer, Serialize};

pub type RunId = String;

/// Declaration of one decision variable for the summary header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub min: f64,
    pub value: f64,
    pub max: f64,
}

/// Declaration of one constraint for the summary header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDecl {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

/// Everything the summary header reports about the model and problem.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProblemDescription {
    pub wells: usize,
    pub pipes: usize,
    pub separators: usize,
    pub boosters: usize,
    pub real_variables: Vec<VariableDecl>,
    pub binary_variables: Vec<VariableDecl>,
    pub constraints: Vec<ConstraintDecl>,
}

/// One whole-model evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryRow {
    pub iteration: usize,
    pub objective: f64,
    pub real_values: Vec<f64>,
    pub binary_values: Vec<f64>,
    pub constraint_values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

/// Best case of a run, by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestCaseRecord {
    pub objective: f64,
    /// Skipped cases carry `+inf`, which JSON stores as `null`.
    #[serde(deserialize_with = "null_as_infinity")]
    pub infeasibility: f64,
    pub real_variables: Vec<NamedValue>,
    pub binary_variables: Vec<NamedValue>,
    pub constraints: Vec<NamedValue>,
}

fn null_as_infinity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub project_name: String,
    pub timestamp: String,
    pub optimizer: String,
    pub evaluations: usize,
    pub simulator_launches: usize,
    pub iterations: usize,
    pub converged: bool,
    pub message: String,
}
