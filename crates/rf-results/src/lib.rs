//! rf-results: iteration summary log and run storage.

pub mod hash;
pub mod store;
pub mod summary;
pub mod types;

pub use hash::compute_run_id;
pub use store::{RunStore, timestamp_now};
pub use summary::SummaryWriter;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Summary row has {found} {what} values, header declared {expected}")]
    RowShape {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}
