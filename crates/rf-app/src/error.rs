//! Error types for the rf-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(#[from] rf_project::ProjectError),

    #[error("Project validation failed: {0}")]
    Validation(#[from] rf_project::ValidationError),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Model compilation failed: {0}")]
    Compile(String),

    #[error("Model error: {0}")]
    Model(#[from] rf_model::ModelError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] rf_sim::SimError),

    #[error("Optimization error: {0}")]
    Optimization(#[from] rf_opt::OptError),

    #[error("Results error: {0}")]
    Results(#[from] rf_results::ResultsError),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<rf_components::ComponentError> for AppError {
    fn from(err: rf_components::ComponentError) -> Self {
        AppError::Model(err.into())
    }
}
