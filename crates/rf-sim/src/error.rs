//! Error types for reservoir-simulator runs.

use std::path::PathBuf;

use rf_model::ModelError;
use thiserror::Error;

/// Errors raised at the reservoir-simulator boundary.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start simulator '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Simulator '{command}' did not finish within {seconds} s")]
    Timeout { command: String, seconds: f64 },

    #[error("Simulator '{command}' exited with status {code:?}")]
    ExitStatus { command: String, code: Option<i32> },

    #[error("Malformed simulator file '{path}': {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Simulator output has no streams for well '{name}'")]
    MissingWell { name: String },

    #[error("Invalid simulator input: {what}")]
    InvalidInput { what: String },

    #[error("Simulator called out of order: {what}")]
    OutOfOrder { what: &'static str },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Whether the run may continue with another case.
    ///
    /// A simulator that ran and failed (bad exit status, timeout) is
    /// recoverable; broken files, folders or configuration are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimError::Timeout { .. } | SimError::ExitStatus { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_process_failures_are_recoverable() {
        assert!(
            SimError::Timeout {
                command: "sim".into(),
                seconds: 1.0
            }
            .is_recoverable()
        );
        assert!(
            SimError::ExitStatus {
                command: "sim".into(),
                code: Some(1)
            }
            .is_recoverable()
        );
        assert!(!SimError::MissingWell { name: "W1".into() }.is_recoverable());
        assert!(!SimError::OutOfOrder { what: "launch" }.is_recoverable());
    }
}
