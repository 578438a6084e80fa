//! Application service layer for resflow.
//!
//! Turns a validated project into a model, a reservoir simulator and an
//! optimizer, and runs the control loop that ties them together. The CLI
//! talks to this crate only.

pub mod compile;
pub mod error;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod runner;

pub use compile::{CompiledProject, build_model, build_optimizer, build_simulator, compile_project};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use project_service::{
    base_dir, list_runs, load_project, load_run, output_dir, validate_project,
};
pub use query::{
    ModelSummary, RoutingEntry, best_case_record, problem_description, routing_table, summarize,
};
pub use runner::{RunReport, Runner};
