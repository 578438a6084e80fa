//! Error types for evaluation and optimization.

use rf_core::error::RfError;
use rf_model::ModelError;
use rf_sim::SimError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptError {
    #[error("Case for {target} has {found} real variables, expected {expected}")]
    VariableCount {
        target: String,
        expected: usize,
        found: usize,
    },

    #[error("Case for the model has {found} {kind} variables, expected {expected}")]
    DiscreteCount {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Component '{name}' cannot be evaluated on its own")]
    UnsupportedTarget { name: String },

    #[error("Unknown component id {id}")]
    UnknownComponent { id: String },

    #[error("Well '{name}' reported no streams")]
    NoWellStreams { name: String },

    #[error("Case error: {0}")]
    Case(#[from] RfError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Simulator error: {0}")]
    Sim(#[from] SimError),

    #[error("Component error: {0}")]
    Component(#[from] rf_components::ComponentError),

    #[error("Optimizer error: {what}")]
    Optimizer { what: String },

    #[error("Evaluator error: {what}")]
    Evaluator { what: String },
}

pub type OptResult<T> = Result<T, OptError>;

impl OptError {
    /// Whether the failed case may be skipped and the run continued.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, OptError::Sim(e) if e.is_recoverable())
    }
}
