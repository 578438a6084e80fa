//! Single evaluation of the current point, optionally with sensitivities.

use tracing::info;

use crate::case::{Case, CaseQueue, CopyMode, Derivative};
use crate::error::{OptError, OptResult};
use crate::optimizer::{Evaluator, Optimizer, OptimizerOutcome};

/// Finite-difference scheme; `step` is relative to `max(1, |x|)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FiniteDifference {
    Forward { step: f64 },
    Central { step: f64 },
}

impl FiniteDifference {
    fn step(self) -> f64 {
        match self {
            FiniteDifference::Forward { step } | FiniteDifference::Central { step } => step,
        }
    }
}

/// Evaluates the model's current point once.
#[derive(Debug, Clone, Default)]
pub struct RunOnceOptimizer {
    sensitivities: Option<FiniteDifference>,
    iterations: usize,
}

impl RunOnceOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach objective and constraint derivatives to the result.
    pub fn with_sensitivities(mut self, scheme: FiniteDifference) -> Self {
        self.sensitivities = Some(scheme);
        self
    }

    fn perturb(base: &Case, index: usize, value: f64) -> OptResult<Case> {
        let mut case = Case::copy_of(base, CopyMode::Structural);
        case.set_real_variable_value(index, value)?;
        Ok(case)
    }

    fn attach_sensitivities(
        &self,
        scheme: FiniteDifference,
        base: &mut Case,
        bounds: &[(f64, f64)],
        evaluator: &mut dyn Evaluator,
    ) -> OptResult<()> {
        let n = base.number_of_real_variables();
        let mut queue = CaseQueue::new();
        // Per variable: (upper point, lower point, distance between them).
        let mut layout = Vec::with_capacity(n);

        for i in 0..n {
            let x = base.real_variable_value(i)?;
            let (min, max) = bounds
                .get(i)
                .copied()
                .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
            let h = scheme.step() * x.abs().max(1.0);
            // Perturbed points never leave [min, max].
            let (hi, lo) = match scheme {
                FiniteDifference::Forward { .. } if x + h <= max => (x + h, x),
                FiniteDifference::Forward { .. } if x > min => (x, (x - h).max(min)),
                FiniteDifference::Forward { .. } => ((x + h).min(max), x),
                FiniteDifference::Central { .. } => ((x + h).min(max), (x - h).max(min)),
            };
            if hi <= lo {
                return Err(OptError::Optimizer {
                    what: format!("variable {} has no room for a finite difference", i + 1),
                });
            }
            let hi_slot = if hi == x {
                None
            } else {
                queue.push(Self::perturb(base, i, hi)?);
                Some(queue.len() - 1)
            };
            let lo_slot = if lo == x {
                None
            } else {
                queue.push(Self::perturb(base, i, lo)?);
                Some(queue.len() - 1)
            };
            layout.push((hi_slot, lo_slot, hi - lo));
        }

        evaluator.evaluate(&mut queue)?;

        let pick = |slot: Option<usize>| slot.and_then(|s| queue.get(s)).unwrap_or(&*base);
        let mut objective = Vec::with_capacity(n);
        let mut constraints = vec![Vec::with_capacity(n); base.number_of_constraints()];
        for (hi_slot, lo_slot, dx) in &layout {
            let (hi, lo) = (pick(*hi_slot), pick(*lo_slot));
            objective.push((hi.objective_value() - lo.objective_value()) / dx);
            for (j, column) in constraints.iter_mut().enumerate() {
                let d = hi.constraint_value(j)? - lo.constraint_value(j)?;
                column.push(d / dx);
            }
        }

        base.set_objective_derivative(Derivative::new(objective));
        for column in constraints {
            base.add_constraint_derivative(Derivative::new(column));
        }
        Ok(())
    }
}

impl Optimizer for RunOnceOptimizer {
    fn name(&self) -> &str {
        "run_once"
    }

    fn initialize(&mut self) {
        self.iterations = 0;
    }

    fn start(&mut self, evaluator: &mut dyn Evaluator) -> OptResult<OptimizerOutcome> {
        let mut queue = CaseQueue::from(vec![evaluator.initial_case()]);
        evaluator.evaluate(&mut queue)?;
        self.iterations += 1;
        let mut base = queue.into_cases().pop().ok_or_else(|| OptError::Optimizer {
            what: "evaluator returned an empty queue".to_string(),
        })?;

        if let Some(scheme) = self.sensitivities {
            let bounds = evaluator.real_bounds();
            self.attach_sensitivities(scheme, &mut base, &bounds, evaluator)?;
            self.iterations += 1;
        }

        info!(
            objective = base.objective_value(),
            infeasibility = base.infeasibility(),
            "Run-once evaluation finished"
        );
        Ok(OptimizerOutcome {
            best: base,
            iterations: self.iterations,
            converged: true,
            message: "single evaluation".to_string(),
        })
    }
}
