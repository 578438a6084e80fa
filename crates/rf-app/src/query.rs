//! Read-only views of a model for reports and the CLI.

use rf_graph::NodeKind;
use rf_model::Model;
use rf_opt::Case;
use rf_results::{BestCaseRecord, ConstraintDecl, NamedValue, ProblemDescription, VariableDecl};

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub name: String,
    pub coupling: String,
    pub time_steps: usize,
    pub wells: usize,
    pub pipes: usize,
    pub separators: usize,
    pub boosters: usize,
    pub capacities: usize,
    pub real_variables: usize,
    pub binary_variables: usize,
    pub constraints: usize,
    pub objective: String,
}

pub fn summarize(model: &Model) -> ModelSummary {
    ModelSummary {
        name: model.name().to_string(),
        coupling: format!("{:?}", model.coupling()).to_lowercase(),
        time_steps: model.schedule().len(),
        wells: model.count(NodeKind::Well),
        pipes: model.count(NodeKind::Pipe),
        separators: model.count(NodeKind::Separator),
        boosters: model.count(NodeKind::Booster),
        capacities: model.capacities().len(),
        real_variables: model.real_variables().len(),
        binary_variables: model.binary_variables().len(),
        constraints: model.constraints().len(),
        objective: model.objective().kind.name().to_string(),
    }
}

/// Summary-file header for the current state of `model`.
pub fn problem_description(model: &Model) -> ProblemDescription {
    ProblemDescription {
        wells: model.count(NodeKind::Well),
        pipes: model.count(NodeKind::Pipe),
        separators: model.count(NodeKind::Separator),
        boosters: model.count(NodeKind::Booster),
        real_variables: model
            .real_variables()
            .iter()
            .map(|v| VariableDecl {
                name: v.name.clone(),
                min: v.min,
                value: v.value,
                max: v.max,
            })
            .collect(),
        binary_variables: model
            .binary_variables()
            .iter()
            .map(|v| VariableDecl {
                name: v.name.clone(),
                min: v.min(),
                value: v.value,
                max: v.max(),
            })
            .collect(),
        constraints: model
            .constraints()
            .iter()
            .map(|c| ConstraintDecl {
                name: c.name.clone(),
                min: c.min,
                max: c.max,
            })
            .collect(),
    }
}

/// `case` with the model's variable and constraint names attached.
pub fn best_case_record(model: &Model, case: &Case) -> BestCaseRecord {
    fn named<'a>(names: impl Iterator<Item = &'a str>, values: &[f64]) -> Vec<NamedValue> {
        names
            .zip(values)
            .map(|(name, value)| NamedValue {
                name: name.to_string(),
                value: *value,
            })
            .collect()
    }

    BestCaseRecord {
        objective: case.objective_value(),
        infeasibility: case.infeasibility(),
        real_variables: named(
            model.real_variables().iter().map(|v| v.name.as_str()),
            case.real_variables(),
        ),
        binary_variables: named(
            model.binary_variables().iter().map(|v| v.name.as_str()),
            case.binary_variables(),
        ),
        constraints: named(
            model.constraints().iter().map(|c| c.name.as_str()),
            case.constraints(),
        ),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingEntry {
    pub well: String,
    pub pipe: String,
    pub fraction: f64,
}

/// Flow fraction from every production well to every pipe.
pub fn routing_table(model: &Model) -> AppResult<Vec<RoutingEntry>> {
    let pipes: Vec<_> = model
        .components()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind() == NodeKind::Pipe)
        .map(|(i, c)| (rf_core::ComponentId::from_index(i as u32), c.name()))
        .collect();

    let mut table = Vec::new();
    for (well_id, well) in model.wells().filter(|(_, w)| w.is_producer()) {
        for (pipe_id, pipe_name) in &pipes {
            table.push(RoutingEntry {
                well: well.name.clone(),
                pipe: pipe_name.to_string(),
                fraction: model.flow_fraction(well_id, *pipe_id)?,
            });
        }
    }
    Ok(table)
}
