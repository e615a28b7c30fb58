//! Property library errors.

use pf_solver::SolverError;
use thiserror::Error;

/// Result type for property calculations.
pub type PropsResult<T> = Result<T, PropsError>;

/// Errors that can occur during moist-air property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropsError {
    /// Input outside the validity range of the correlations.
    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },

    /// Physically impossible combination (e.g. vapor pressure above barometric).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// An inverse relation failed to converge or bracket.
    #[error("Property solve failed: {0}")]
    Solver(#[from] SolverError),
}
