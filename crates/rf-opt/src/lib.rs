//! Evaluation and optimization layer for resflow.
//!
//! - `Case`: one evaluation point (variable values in, constraint and
//!   objective values out), batched per optimizer iteration in a `CaseQueue`
//! - `Launcher`: the evaluation function mapping a case onto the model, with
//!   the reservoir-rerun decision and single-component evaluation
//! - `Optimizer`/`Evaluator`: the boundary between optimizer back ends and
//!   whatever owns the model, plus two built-in optimizers

pub mod case;
pub mod compass;
pub mod error;
pub mod launcher;
pub mod optimizer;
pub mod run_once;

pub use case::{Case, CaseQueue, CopyMode, Derivative};
pub use compass::{CompassSearchOptimizer, CompassSettings};
pub use error::{OptError, OptResult};
pub use launcher::{EvalTarget, LaunchEvent, Launcher};
pub use optimizer::{Evaluator, Optimizer, OptimizerOutcome, merit};
pub use run_once::{FiniteDifference, RunOnceOptimizer};
