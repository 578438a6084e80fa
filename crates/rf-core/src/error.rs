use thiserror::Error;

pub type RfResult<T> = Result<T, RfError>;

/// Low-level failures shared by every resflow crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RfError {
    /// A rate, pressure or variable value came out as NaN or infinite.
    #[error("{what} is not finite ({value})")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Positional access into a case or variable list.
    #[error("{what}: index {index} out of range for length {len}")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
