/// Floating point type used throughout system
pub type Real = f64;

/// Absolute and relative tolerance pair.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    /// Loose tolerances for quantities that pass through an iterative solve.
    pub fn solved() -> Self {
        Self {
            abs: 1e-8,
            rel: 1e-4,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Linear interpolation between `a` and `b` at fraction `t`.
#[inline]
pub fn lerp(a: Real, b: Real, t: Real) -> Real {
    a + t * (b - a)
}
