//! Built-in optimizers against an analytic evaluator.

use rf_opt::{
    Case, CaseQueue, CompassSearchOptimizer, CompassSettings, Evaluator, FiniteDifference,
    OptResult, Optimizer, RunOnceOptimizer,
};

/// Maximizes `-(x0 - 1)^2 - (x1 + 0.5)^2`; one constraint `x0 + x1 <= 1`.
struct Paraboloid {
    start: Vec<f64>,
    bounds: Vec<(f64, f64)>,
    points: Vec<(f64, f64)>,
    evaluations: usize,
    batches: usize,
}

impl Paraboloid {
    fn new(start: Vec<f64>) -> Self {
        Self {
            start,
            bounds: vec![(-2.0, 2.0), (-2.0, 2.0)],
            points: Vec::new(),
            evaluations: 0,
            batches: 0,
        }
    }
}

impl Evaluator for Paraboloid {
    fn initial_case(&self) -> Case {
        Case::with_variables(self.start.clone(), vec![1.0], vec![])
    }

    fn real_bounds(&self) -> Vec<(f64, f64)> {
        self.bounds.clone()
    }

    fn evaluate(&mut self, queue: &mut CaseQueue) -> OptResult<()> {
        self.batches += 1;
        for case in queue.iter_mut() {
            self.evaluations += 1;
            let x0 = case.real_variable_value(0)?;
            let x1 = case.real_variable_value(1)?;
            self.points.push((x0, x1));
            case.clear_constraints();
            case.add_constraint_value(x0 + x1);
            case.set_objective_value(-(x0 - 1.0).powi(2) - (x1 + 0.5).powi(2));
            case.set_infeasibility((x0 + x1 - 1.0).max(0.0));
        }
        Ok(())
    }
}

#[test]
fn run_once_evaluates_the_start_point() {
    let mut eval = Paraboloid::new(vec![0.0, 0.0]);
    let mut opt = RunOnceOptimizer::new();
    opt.initialize();
    let outcome = opt.start(&mut eval).unwrap();
    assert_eq!(eval.evaluations, 1);
    assert_eq!(outcome.iterations, 1);
    assert!((outcome.best.objective_value() + 1.25).abs() < 1e-12);
    assert!(outcome.best.objective_derivative().is_none());
}

#[test]
fn central_differences_recover_gradients() {
    let mut eval = Paraboloid::new(vec![0.0, 0.0]);
    let mut opt =
        RunOnceOptimizer::new().with_sensitivities(FiniteDifference::Central { step: 1e-4 });
    let outcome = opt.start(&mut eval).unwrap();
    assert_eq!(eval.batches, 2);
    assert_eq!(eval.evaluations, 5);

    let grad = outcome.best.objective_derivative().unwrap();
    assert!((grad.get(0).unwrap() - 2.0).abs() < 1e-6);
    assert!((grad.get(1).unwrap() + 1.0).abs() < 1e-6);

    let dc = outcome.best.constraint_derivative(0).unwrap();
    assert!((dc.get(0).unwrap() - 1.0).abs() < 1e-6);
    assert!((dc.get(1).unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn forward_difference_steps_back_at_upper_bound() {
    let mut eval = Paraboloid::new(vec![2.0, 0.0]);
    let mut opt =
        RunOnceOptimizer::new().with_sensitivities(FiniteDifference::Forward { step: 1e-6 });
    let outcome = opt.start(&mut eval).unwrap();
    let grad = outcome.best.objective_derivative().unwrap();
    // d/dx0 at x0 = 2: -2 (2 - 1)
    assert!((grad.get(0).unwrap() + 2.0).abs() < 1e-4);
}

#[test]
fn forward_difference_step_back_is_clamped_to_lower_bound() {
    let mut eval = Paraboloid::new(vec![2.0, 0.0]);
    eval.bounds[0] = (1.9, 2.0);
    // h = 0.5 * 2 reaches past the lower bound
    let mut opt =
        RunOnceOptimizer::new().with_sensitivities(FiniteDifference::Forward { step: 0.5 });
    let outcome = opt.start(&mut eval).unwrap();

    for (x0, x1) in &eval.points {
        assert!((1.9..=2.0).contains(x0), "x0 = {x0}");
        assert!((-2.0..=2.0).contains(x1), "x1 = {x1}");
    }
    let grad = outcome.best.objective_derivative().unwrap();
    // (f(2) - f(1.9)) / 0.1 = (-1 + 0.81) / 0.1
    assert!((grad.get(0).unwrap() + 1.9).abs() < 1e-9);
}

#[test]
fn forward_difference_at_a_pinned_variable_is_an_error() {
    let mut eval = Paraboloid::new(vec![1.0, 0.0]);
    eval.bounds[0] = (1.0, 1.0);
    let mut opt =
        RunOnceOptimizer::new().with_sensitivities(FiniteDifference::Forward { step: 1e-3 });
    assert!(opt.start(&mut eval).is_err());
    assert_eq!(eval.points.len(), 1);
}

#[test]
fn compass_search_finds_the_optimum() {
    let mut eval = Paraboloid::new(vec![0.0, 0.0]);
    let mut opt = CompassSearchOptimizer::new(CompassSettings {
        max_iterations: 500,
        ..CompassSettings::default()
    });
    opt.initialize();
    let outcome = opt.start(&mut eval).unwrap();

    assert!(outcome.converged, "{}", outcome.message);
    let x = outcome.best.real_variables();
    assert!((x[0] - 1.0).abs() < 1e-2, "x0 = {}", x[0]);
    assert!((x[1] + 0.5).abs() < 1e-2, "x1 = {}", x[1]);
    assert_eq!(outcome.best.infeasibility(), 0.0);
    assert_eq!(outcome.best.binary_variables(), &[1.0]);
    assert_eq!(eval.batches, outcome.iterations + 1);
}

#[test]
fn compass_search_rejects_bad_contraction() {
    let mut eval = Paraboloid::new(vec![0.0, 0.0]);
    let mut opt = CompassSearchOptimizer::new(CompassSettings {
        contraction: 1.5,
        ..CompassSettings::default()
    });
    assert!(opt.start(&mut eval).is_err());
}
