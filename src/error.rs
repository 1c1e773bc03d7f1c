use thiserror::Error;

/// Hard invariant violations caught at the API/CLI boundary.
///
/// Soft slider bounds are never errors; see `api::RangeWarning`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be >= 0")]
    Negative { field: &'static str },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("termYears must be >= 1")]
    ZeroTerm,

    #[error("rampUp[{index}] must be in (0, 1], got {value}")]
    RampMultiplier { index: usize, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("target month must be between 1 and {horizon}, got {month}")]
    TargetMonth { month: u32, horizon: u32 },

    #[error("searchMax ({max}) must be greater than searchMin ({min})")]
    EmptyRange { min: u32, max: u32 },

    #[error("maxIterations must be > 0")]
    NoIterations,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error("'{0}' does not produce a report")]
    Unsupported(&'static str),

    #[error("failed to serialize output: {0}")]
    Serialize(String),
}
