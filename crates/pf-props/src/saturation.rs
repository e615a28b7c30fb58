//! Saturation vapor pressure of water (ASHRAE Handbook, Hyland–Wexler 1983).
//!
//! Below the triple point the fit is over ice, above it over liquid water.

use pf_core::UnitSystem;

use crate::error::{PropsError, PropsResult};

const RANKINE_OFFSET: f64 = 459.67;
const KELVIN_OFFSET: f64 = 273.15;

/// Triple point of water in the unit system's temperature scale.
pub fn triple_point(units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Ip => 32.018,
        UnitSystem::Si => 0.01,
    }
}

/// Freezing point of water in the unit system's temperature scale.
pub fn freezing_point(units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Ip => 32.0,
        UnitSystem::Si => 0.0,
    }
}

/// Absolute temperature (°R or K).
#[inline]
pub fn absolute(units: UnitSystem, t: f64) -> f64 {
    match units {
        UnitSystem::Ip => t + RANKINE_OFFSET,
        UnitSystem::Si => t + KELVIN_OFFSET,
    }
}

/// Natural log of the saturation vapor pressure at `t_dry_bulb`.
///
/// Continuous within each phase; the ice and water fits meet at the triple
/// point with a small step.
pub fn ln_sat_vapor_pressure(units: UnitSystem, t_dry_bulb: f64) -> PropsResult<f64> {
    let (lo, hi) = units.temperature_domain();
    if !t_dry_bulb.is_finite() || t_dry_bulb < lo || t_dry_bulb > hi {
        return Err(PropsError::OutOfRange {
            what: "dry-bulb temperature",
            value: t_dry_bulb,
        });
    }

    let t = absolute(units, t_dry_bulb);
    let ice = t_dry_bulb <= triple_point(units);
    let ln = match (units, ice) {
        (UnitSystem::Ip, true) => {
            -1.0214165e4 / t - 4.8932428 - 5.3765794e-3 * t + 1.9202377e-7 * t * t
                + 3.5575832e-10 * t.powi(3)
                - 9.0344688e-14 * t.powi(4)
                + 4.1635019 * t.ln()
        }
        (UnitSystem::Ip, false) => {
            -1.0440397e4 / t - 1.1294650e1 - 2.7022355e-2 * t + 1.2890360e-5 * t * t
                - 2.4780681e-9 * t.powi(3)
                + 6.5459673 * t.ln()
        }
        (UnitSystem::Si, true) => {
            -5.6745359e3 / t + 6.3925247 - 9.677843e-3 * t + 6.2215701e-7 * t * t
                + 2.0747825e-9 * t.powi(3)
                - 9.484024e-13 * t.powi(4)
                + 4.1635019 * t.ln()
        }
        (UnitSystem::Si, false) => {
            -5.8002206e3 / t + 1.3914993 - 4.8640239e-2 * t + 4.1764768e-5 * t * t
                - 1.4452093e-8 * t.powi(3)
                + 6.5459673 * t.ln()
        }
    };
    Ok(ln)
}

/// Saturation vapor pressure (psia or Pa).
pub fn sat_vapor_pressure(units: UnitSystem, t_dry_bulb: f64) -> PropsResult<f64> {
    Ok(ln_sat_vapor_pressure(units, t_dry_bulb)?.exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::{Tolerances, nearly_equal};

    const REL: Tolerances = Tolerances {
        abs: 0.0,
        rel: 3e-4,
    };

    #[test]
    fn ip_reference_values() {
        let cases = [
            (-4.0, 0.014974),
            (23.0, 0.058268),
            (41.0, 0.12656),
            (77.0, 0.45973),
            (122.0, 1.79140),
            (212.0, 14.7094),
        ];
        for (t, expected) in cases {
            let p = sat_vapor_pressure(UnitSystem::Ip, t).unwrap();
            assert!(nearly_equal(p, expected, REL), "T={t}: {p} vs {expected}");
        }
    }

    #[test]
    fn si_reference_values() {
        let cases = [
            (-20.0, 103.24),
            (-5.0, 401.74),
            (5.0, 872.6),
            (25.0, 3169.7),
            (50.0, 12351.3),
            (100.0, 101418.0),
        ];
        for (t, expected) in cases {
            let p = sat_vapor_pressure(UnitSystem::Si, t).unwrap();
            assert!(nearly_equal(p, expected, REL), "T={t}: {p} vs {expected}");
        }
    }

    #[test]
    fn rejects_out_of_domain() {
        assert!(sat_vapor_pressure(UnitSystem::Si, -150.0).is_err());
        assert!(sat_vapor_pressure(UnitSystem::Ip, 400.0).is_err());
        assert!(sat_vapor_pressure(UnitSystem::Ip, f64::NAN).is_err());
    }

    #[test]
    fn increases_with_temperature() {
        let mut last = 0.0;
        for i in 0..60 {
            let t = -40.0 + i as f64 * 2.0;
            let p = sat_vapor_pressure(UnitSystem::Si, t).unwrap();
            assert!(p > last);
            last = p;
        }
    }
}
