//! Boundary between optimizer back ends and the owner of the model.

use crate::case::{Case, CaseQueue};
use crate::error::OptResult;

/// Evaluates batches of whole-model cases on behalf of an optimizer.
pub trait Evaluator {
    /// The model's current point, outputs blank.
    fn initial_case(&self) -> Case;

    /// `(min, max)` of every real variable, in model order.
    fn real_bounds(&self) -> Vec<(f64, f64)>;

    /// Evaluate every case of `queue` in place.
    ///
    /// A case the evaluator chose to skip comes back with infinite
    /// infeasibility.
    fn evaluate(&mut self, queue: &mut CaseQueue) -> OptResult<()>;
}

/// Result of an optimizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerOutcome {
    pub best: Case,
    pub iterations: usize,
    pub converged: bool,
    pub message: String,
}

pub trait Optimizer {
    fn name(&self) -> &str;

    /// Reset internal state before a run.
    fn initialize(&mut self);

    /// Drive `evaluator` until the optimizer stops.
    fn start(&mut self, evaluator: &mut dyn Evaluator) -> OptResult<OptimizerOutcome>;
}

/// Objective penalized by infeasibility; higher is better.
///
/// Skipped cases (infinite infeasibility) rank below everything else.
pub fn merit(case: &Case, penalty: f64) -> f64 {
    let infeasibility = case.infeasibility();
    if infeasibility.is_infinite() || case.objective_value().is_nan() {
        return f64::NEG_INFINITY;
    }
    case.objective_value() - penalty * infeasibility
}
