//! Error types for root-finding operations.

use thiserror::Error;

/// Errors that can occur while bracketing or converging on a root.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Bracket endpoints must be finite and distinct: [{lower}, {upper}]")]
    InvalidBracket { lower: f64, upper: f64 },

    #[error("No sign change on [{lower}, {upper}] (f = {f_lower:.6e}, {f_upper:.6e})")]
    NoSignChange {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },

    #[error("Objective returned a non-finite value at x = {x}")]
    NonFiniteResidual { x: f64 },

    #[error("Maximum iterations {iterations} reached (x = {x}, f = {residual:.6e})")]
    MaxIterations {
        iterations: usize,
        x: f64,
        residual: f64,
    },

    #[error("Invalid solver configuration: {what}")]
    Config { what: &'static str },
}

pub type SolverResult<T> = Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SolverError::NoSignChange {
            lower: 0.0,
            upper: 1.0,
            f_lower: 1.0,
            f_upper: 2.0,
        };
        assert!(err.to_string().contains("No sign change"));

        let err = SolverError::MaxIterations {
            iterations: 5,
            x: 1.0,
            residual: 0.1,
        };
        assert!(err.to_string().contains("Maximum iterations 5"));
    }
}
