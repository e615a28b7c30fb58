use crate::error::{SolverError, SolverResult};

/// Root finder configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootConfig {
    /// Maximum objective evaluations after the two bracket endpoints
    pub max_iterations: usize,
    /// Absolute tolerance on x
    pub x_abs_tol: f64,
    /// Relative tolerance on x
    pub x_rel_tol: f64,
    /// Accept any point whose |f| falls at or below this value
    pub residual_tol: f64,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            x_abs_tol: 1e-10,
            x_rel_tol: 1e-12,
            residual_tol: 0.0,
        }
    }
}

impl RootConfig {
    /// Config with a different absolute x tolerance.
    pub fn with_x_tol(self, x_abs_tol: f64) -> Self {
        Self { x_abs_tol, ..self }
    }

    /// Validates that the budget is non-zero and all tolerances are finite and non-negative.
    pub fn validate(&self) -> SolverResult<()> {
        if self.max_iterations == 0 {
            return Err(SolverError::Config {
                what: "max_iterations must be positive",
            });
        }
        if !self.x_abs_tol.is_finite() || self.x_abs_tol < 0.0 {
            return Err(SolverError::Config {
                what: "x_abs_tol must be finite and non-negative",
            });
        }
        if !self.x_rel_tol.is_finite() || self.x_rel_tol < 0.0 {
            return Err(SolverError::Config {
                what: "x_rel_tol must be finite and non-negative",
            });
        }
        if !self.residual_tol.is_finite() || self.residual_tol < 0.0 {
            return Err(SolverError::Config {
                what: "residual_tol must be finite and non-negative",
            });
        }
        Ok(())
    }
}
