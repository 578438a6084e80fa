//! Error types for model operations.

use rf_components::ComponentError;
use rf_core::error::RfError;
use rf_graph::GraphError;
use thiserror::Error;

/// Errors raised while building, resolving or updating a model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model routing is already resolved; topology cannot change after initialization")]
    AlreadyResolved,

    #[error("Model routing is not resolved; call initialize() first")]
    NotResolved,

    #[error("Invalid schedule: {what}")]
    InvalidSchedule { what: String },

    #[error("Duplicate component name '{name}'")]
    DuplicateName { name: String },

    #[error("Unknown component '{name}'")]
    UnknownComponent { name: String },

    #[error("'{component}' routes to unknown component '{target}'")]
    UnknownTarget { component: String, target: String },

    #[error("'{name}' is not a {expected}")]
    WrongKind { name: String, expected: &'static str },

    #[error("'{component}' has {found} time steps, expected {expected}")]
    TimeStepMismatch {
        component: String,
        expected: usize,
        found: usize,
    },

    #[error("{what} index {index} out of bounds (len {len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<ModelError> for RfError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::AlreadyResolved | ModelError::NotResolved => RfError::Invariant {
                what: "model resolution state",
            },
            ModelError::InvalidSchedule { .. } => RfError::InvalidArg { what: "schedule" },
            ModelError::DuplicateName { .. }
            | ModelError::UnknownComponent { .. }
            | ModelError::UnknownTarget { .. }
            | ModelError::WrongKind { .. } => RfError::InvalidArg {
                what: "component reference",
            },
            ModelError::TimeStepMismatch { .. } => RfError::Invariant {
                what: "time step counts differ between connected components",
            },
            ModelError::IndexOob { what, index, len } => RfError::IndexOob { what, index, len },
            ModelError::Graph(e) => e.into(),
            ModelError::Component(e) => e.into(),
        }
    }
}
