//! Brent's method: bisection safeguarded by secant and inverse quadratic steps.

use tracing::{debug, trace};

use crate::config::RootConfig;
use crate::error::SolverError;

/// Converged root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub x: f64,
    pub residual: f64,
    pub iterations: usize,
}

/// Finds a root of `f` inside `[a, b]`.
///
/// The objective is fallible so property lookups can propagate their own
/// errors; solver failures are converted through `E: From<SolverError>`.
/// The endpoints may be given in either order. An endpoint that evaluates to
/// exactly zero is returned without iterating.
pub fn find_root<F, E>(mut f: F, a: f64, b: f64, config: &RootConfig) -> Result<Root, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    config.validate()?;
    if !a.is_finite() || !b.is_finite() || a == b {
        return Err(SolverError::InvalidBracket { lower: a, upper: b }.into());
    }

    let (mut a, mut b) = if a < b { (a, b) } else { (b, a) };
    let mut fa = checked(&mut f, a)?;
    let mut fb = checked(&mut f, b)?;

    if fa == 0.0 {
        return Ok(Root {
            x: a,
            residual: 0.0,
            iterations: 0,
        });
    }
    if fb == 0.0 {
        return Ok(Root {
            x: b,
            residual: 0.0,
            iterations: 0,
        });
    }
    if fa.signum() == fb.signum() {
        return Err(SolverError::NoSignChange {
            lower: a,
            upper: b,
            f_lower: fa,
            f_upper: fb,
        }
        .into());
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for iter in 1..=config.max_iterations {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * (config.x_abs_tol + config.x_rel_tol * b.abs());
        let xm = 0.5 * (c - b);

        trace!(iter, x = b, residual = fb, half_width = xm, "brent step");

        if xm.abs() <= tol || fb == 0.0 || fb.abs() <= config.residual_tol {
            debug!(iterations = iter, x = b, residual = fb, "root converged");
            return Ok(Root {
                x: b,
                residual: fb,
                iterations: iter,
            });
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q0 = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q0 * (q0 - r) - (b - a) * (r - 1.0)),
                    (q0 - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * xm * q - (tol * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(xm) };
        fb = checked(&mut f, b)?;
    }

    Err(SolverError::MaxIterations {
        iterations: config.max_iterations,
        x: b,
        residual: fb,
    }
    .into())
}

fn checked<F, E>(f: &mut F, x: f64) -> Result<f64, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    let v = f(x)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SolverError::NonFiniteResidual { x }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(v: f64) -> Result<f64, SolverError> {
        Ok(v)
    }

    #[test]
    fn finds_sqrt_two() {
        let root = find_root(|x| ok(x * x - 2.0), 0.0, 2.0, &RootConfig::default()).unwrap();
        assert!((root.x - 2f64.sqrt()).abs() < 1e-9);
        assert!(root.iterations > 0);
    }

    #[test]
    fn accepts_reversed_bracket() {
        let root = find_root(|x| ok(x - 0.25), 1.0, 0.0, &RootConfig::default()).unwrap();
        assert!((root.x - 0.25).abs() < 1e-10);
    }

    #[test]
    fn exact_endpoint_returns_immediately() {
        let root = find_root(|x| ok(x - 1.0), 1.0, 3.0, &RootConfig::default()).unwrap();
        assert_eq!(root.x, 1.0);
        assert_eq!(root.iterations, 0);
    }

    #[test]
    fn no_sign_change_is_error() {
        let err = find_root(|x| ok(x * x + 1.0), -1.0, 1.0, &RootConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::NoSignChange { .. }));
    }

    #[test]
    fn degenerate_bracket_is_error() {
        let err = find_root(|x| ok(x), 1.0, 1.0, &RootConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::InvalidBracket { .. }));

        let err = find_root(|x| ok(x), f64::NAN, 1.0, &RootConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::InvalidBracket { .. }));
    }

    #[test]
    fn non_finite_objective_is_error() {
        let err = find_root(|x| ok(1.0 / x), 0.0, 1.0, &RootConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::NonFiniteResidual { .. }));
    }

    #[test]
    fn budget_exhaustion_is_error() {
        let cfg = RootConfig {
            max_iterations: 2,
            x_abs_tol: 0.0,
            x_rel_tol: 0.0,
            residual_tol: 0.0,
        };
        let err = find_root(|x| ok(x.powi(3) - x - 2.0), 1.0, 2.0, &cfg).unwrap_err();
        assert!(matches!(err, SolverError::MaxIterations { iterations: 2, .. }));
    }

    #[test]
    fn objective_errors_propagate() {
        #[derive(Debug, PartialEq)]
        enum Custom {
            Lookup,
            Solver,
        }
        impl From<SolverError> for Custom {
            fn from(_: SolverError) -> Self {
                Custom::Solver
            }
        }

        let err = find_root(
            |x| if x > 0.5 { Err(Custom::Lookup) } else { Ok(x) },
            -1.0,
            1.0,
            &RootConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, Custom::Lookup);
    }
}
