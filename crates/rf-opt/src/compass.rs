//! Bound-constrained compass (pattern) search over the real variables.

use tracing::{debug, info};

use crate::case::{Case, CaseQueue, CopyMode};
use crate::error::{OptError, OptResult};
use crate::optimizer::{Evaluator, Optimizer, OptimizerOutcome, merit};

#[derive(Debug, Clone, PartialEq)]
pub struct CompassSettings {
    /// Initial step as a fraction of each variable's range.
    pub initial_step: f64,
    /// Converged once the step fraction falls below this.
    pub min_step: f64,
    /// Step reduction factor after an iteration without improvement.
    pub contraction: f64,
    pub max_iterations: usize,
    /// Weight of infeasibility in the merit function.
    pub penalty: f64,
}

impl Default for CompassSettings {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            min_step: 1e-3,
            contraction: 0.5,
            max_iterations: 50,
            penalty: 1e3,
        }
    }
}

/// Polls `x +- step * range` along every real variable each iteration and
/// moves to the best improving point; contracts the step otherwise.
/// Binary and integer variables stay at their initial values.
#[derive(Debug, Clone, Default)]
pub struct CompassSearchOptimizer {
    settings: CompassSettings,
    iterations: usize,
}

impl CompassSearchOptimizer {
    pub fn new(settings: CompassSettings) -> Self {
        Self {
            settings,
            iterations: 0,
        }
    }

    pub fn settings(&self) -> &CompassSettings {
        &self.settings
    }

    fn poll(current: &Case, bounds: &[(f64, f64)], step: f64) -> OptResult<CaseQueue> {
        let mut queue = CaseQueue::new();
        for (i, (min, max)) in bounds.iter().enumerate() {
            let range = max - min;
            if !range.is_finite() || range <= 0.0 {
                continue;
            }
            let x = current.real_variable_value(i)?;
            for candidate in [(x + step * range).min(*max), (x - step * range).max(*min)] {
                if candidate != x {
                    let mut case = Case::copy_of(current, CopyMode::Structural);
                    case.set_real_variable_value(i, candidate)?;
                    queue.push(case);
                }
            }
        }
        Ok(queue)
    }
}

impl Optimizer for CompassSearchOptimizer {
    fn name(&self) -> &str {
        "compass_search"
    }

    fn initialize(&mut self) {
        self.iterations = 0;
    }

    fn start(&mut self, evaluator: &mut dyn Evaluator) -> OptResult<OptimizerOutcome> {
        let s = self.settings.clone();
        if s.contraction.is_nan() || s.contraction <= 0.0 || s.contraction >= 1.0 {
            return Err(OptError::Optimizer {
                what: format!("contraction must be in (0, 1), got {}", s.contraction),
            });
        }

        let bounds = evaluator.real_bounds();
        let mut queue = CaseQueue::from(vec![evaluator.initial_case()]);
        evaluator.evaluate(&mut queue)?;
        let mut current = queue.into_cases().pop().ok_or_else(|| OptError::Optimizer {
            what: "evaluator returned an empty queue".to_string(),
        })?;
        let mut current_merit = merit(&current, s.penalty);
        let mut step = s.initial_step;
        let mut converged = false;

        while self.iterations < s.max_iterations {
            if step < s.min_step {
                converged = true;
                break;
            }
            self.iterations += 1;

            let mut queue = Self::poll(&current, &bounds, step)?;
            if queue.is_empty() {
                converged = true;
                break;
            }
            evaluator.evaluate(&mut queue)?;

            let best = queue
                .into_cases()
                .into_iter()
                .map(|c| (merit(&c, s.penalty), c))
                .max_by(|a, b| a.0.total_cmp(&b.0));

            match best {
                Some((m, case)) if m > current_merit => {
                    debug!(iteration = self.iterations, merit = m, step, "Compass move");
                    current = case;
                    current_merit = m;
                }
                _ => {
                    step *= s.contraction;
                    debug!(iteration = self.iterations, step, "Compass contraction");
                }
            }
        }

        let message = if converged {
            format!("step {step:.3e} below minimum")
        } else {
            format!("reached {} iterations", s.max_iterations)
        };
        info!(
            iterations = self.iterations,
            objective = current.objective_value(),
            infeasibility = current.infeasibility(),
            %message,
            "Compass search finished"
        );

        Ok(OptimizerOutcome {
            best: current,
            iterations: self.iterations,
            converged,
            message,
        })
    }
}
