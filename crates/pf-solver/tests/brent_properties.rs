//! Property tests for the bracketed root finder.

use pf_solver::{RootConfig, SolverError, find_root};
use proptest::prelude::*;

proptest! {
    #[test]
    fn linear_roots_are_exact(root in -1.0e3f64..1.0e3, slope in 0.1f64..50.0, width in 0.5f64..100.0) {
        let lo = root - width;
        let hi = root + 0.5 * width;
        let found = find_root(
            |x| Ok::<_, SolverError>(slope * (x - root)),
            lo,
            hi,
            &RootConfig::default(),
        )
        .unwrap();
        prop_assert!((found.x - root).abs() <= 1e-8 * (1.0 + root.abs()));
    }

    #[test]
    fn monotone_exponential_converges_within_budget(target in 0.01f64..100.0) {
        let cfg = RootConfig::default();
        let found = find_root(
            |x| Ok::<_, SolverError>(x.exp() - target),
            -10.0,
            10.0,
            &cfg,
        )
        .unwrap();
        prop_assert!(found.iterations <= cfg.max_iterations);
        prop_assert!((found.x - target.ln()).abs() < 1e-8);
    }
}

#[test]
fn saturation_like_curve() {
    // ln-pressure style curve with a root near 283.15
    let f = |t: f64| Ok::<_, SolverError>(-5800.2206 / t + 1.3914993 - 0.048640239 * t
        + 4.1764768e-5 * t * t - 1.4452093e-8 * t.powi(3) + 6.5459673 * t.ln() - 1227.9_f64.ln());
    let found = find_root(f, 250.0, 320.0, &RootConfig::default()).unwrap();
    assert!((found.x - 283.15).abs() < 0.05, "x = {}", found.x);
}
