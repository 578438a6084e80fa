//! Error types for component operations.

use rf_core::error::RfError;
use thiserror::Error;

/// Errors that can occur while updating a network element.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value in '{component}': {what}")]
    NonPhysical {
        component: String,
        what: &'static str,
    },

    #[error("Time step mismatch: '{component}' has {component_steps}, '{other}' has {other_steps}")]
    TimeStepMismatch {
        component: String,
        component_steps: usize,
        other: String,
        other_steps: usize,
    },

    #[error("'{component}' has no pipe connections")]
    NoConnections { component: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for RfError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what, .. } => RfError::InvalidArg { what },
            ComponentError::TimeStepMismatch { .. } => RfError::Invariant {
                what: "time step counts differ between connected components",
            },
            ComponentError::NoConnections { .. } => RfError::Invariant {
                what: "production well without pipe connections",
            },
            ComponentError::InvalidArg { what } => RfError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_component() {
        let err = ComponentError::TimeStepMismatch {
            component: "PROD1".into(),
            component_steps: 3,
            other: "PIPE2".into(),
            other_steps: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("PROD1"));
        assert!(msg.contains("PIPE2"));
    }

    #[test]
    fn error_conversion() {
        let comp_err = ComponentError::InvalidArg { what: "test" };
        let rf_err: RfError = comp_err.into();
        assert!(matches!(rf_err, RfError::InvalidArg { .. }));
    }
}
