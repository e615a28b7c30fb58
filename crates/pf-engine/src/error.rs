//! Engine error taxonomy.

use pf_props::PropsError;
use pf_solver::SolverError;
use thiserror::Error;

use crate::state::Property;

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by state resolution, process solvers and coil analysis.
///
/// Physically questionable but well-defined requests are not errors; those
/// produce warnings on the result instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A caller-supplied value is outside its domain.
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The two properties given do not form a supported pair.
    #[error("Unsupported input pair: {first} + {second}")]
    UnsupportedPair { first: Property, second: Property },

    /// An iterative solve failed to bracket or converge.
    #[error("Resolution failed: {what}")]
    Resolution { what: String },

    /// A process line does not cross the saturation curve.
    #[error("No intersection with the saturation curve: {what}")]
    NoIntersection { what: String },

    /// A derived quantity violates a physical constraint.
    #[error("Invalid result: {what}")]
    InvalidResult { what: String },
}

impl EngineError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn resolution(what: impl Into<String>) -> Self {
        Self::Resolution { what: what.into() }
    }

    pub fn no_intersection(what: impl Into<String>) -> Self {
        Self::NoIntersection { what: what.into() }
    }

    pub fn invalid_result(what: impl Into<String>) -> Self {
        Self::InvalidResult { what: what.into() }
    }
}

impl From<PropsError> for EngineError {
    fn from(err: PropsError) -> Self {
        match err {
            PropsError::OutOfRange { what, value } => {
                EngineError::invalid(what, format!("{value} is out of range"))
            }
            PropsError::NonPhysical { what } => EngineError::invalid("state", what),
            PropsError::Solver(e) => EngineError::resolution(e.to_string()),
        }
    }
}

impl From<SolverError> for EngineError {
    fn from(err: SolverError) -> Self {
        EngineError::resolution(err.to_string())
    }
}

/// Requires a value to be finite.
pub(crate) fn finite(field: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::invalid(field, "must be finite"))
    }
}

/// Requires a fraction in `[0, 1]`.
pub(crate) fn unit_fraction(field: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(EngineError::invalid(field, format!("{value} must be between 0 and 1")))
    }
}

/// Requires a fraction strictly inside `(0, 1)`.
pub(crate) fn open_fraction(field: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(EngineError::invalid(
            field,
            format!("{value} must be between 0 and 1 (exclusive)"),
        ))
    }
}
