//! One "move toward a target by a fraction ε" rule shared by coils,
//! humidifiers and evaporative coolers.

use pf_core::lerp;

use crate::error::{EngineResult, unit_fraction};
use crate::path::ChartPoint;
use crate::resolver::{resolve, resolve_dry_bulb_hum_ratio};
use crate::state::{AirState, Property};

/// What the air moves toward, and along which constraint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Approach {
    /// Straight chart line toward a point, both axes interpolated.
    Straight(ChartPoint),
    /// Along the constant wet-bulb line toward saturation at that wet bulb.
    WetBulb(f64),
    /// Constant humidity ratio toward a limiting dry bulb.
    Sensible(f64),
}

/// Effectiveness must lie in `[0, 1]`.
pub fn check_effectiveness(effectiveness: f64) -> EngineResult<f64> {
    unit_fraction("effectiveness", effectiveness)
}

/// State a fraction `effectiveness` of the way from `start` toward `toward`.
///
/// `effectiveness` is not validated here; callers check it up front.
pub fn approach(start: &AirState, toward: Approach, effectiveness: f64) -> EngineResult<AirState> {
    let conditions = start.conditions();
    match toward {
        Approach::Straight(target) => {
            let p = start.chart_point().toward(target, effectiveness);
            resolve_dry_bulb_hum_ratio(&conditions, p.dry_bulb, p.humidity_ratio)
        }
        Approach::WetBulb(wet_bulb) => {
            let tdb = lerp(start.dry_bulb(), wet_bulb, effectiveness).max(wet_bulb);
            resolve(&conditions, (Property::DryBulb, tdb), (Property::WetBulb, wet_bulb))
        }
        Approach::Sensible(limit) => {
            let tdb = lerp(start.dry_bulb(), limit, effectiveness);
            resolve_dry_bulb_hum_ratio(&conditions, tdb, start.humidity_ratio())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::UnitSystem;

    use crate::conditions::Conditions;

    fn start() -> AirState {
        resolve(
            &Conditions::sea_level(UnitSystem::Ip),
            (Property::DryBulb, 95.0),
            (Property::RelativeHumidity, 0.2),
        )
        .unwrap()
    }

    #[test]
    fn zero_effectiveness_is_start() {
        let s = start();
        let end = approach(&s, Approach::WetBulb(s.wet_bulb()), 0.0).unwrap();
        assert!((end.dry_bulb() - s.dry_bulb()).abs() < 1e-12);
        assert!((end.humidity_ratio() - s.humidity_ratio()).abs() < 1e-9);
    }

    #[test]
    fn full_wet_bulb_approach_saturates() {
        let s = start();
        let end = approach(&s, Approach::WetBulb(s.wet_bulb()), 1.0).unwrap();
        assert!((end.dry_bulb() - s.wet_bulb()).abs() < 1e-9);
        assert!((end.relative_humidity() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn sensible_approach_keeps_humidity_ratio() {
        let s = start();
        let end = approach(&s, Approach::Sensible(70.0), 0.6).unwrap();
        assert_eq!(end.humidity_ratio(), s.humidity_ratio());
        assert!((end.dry_bulb() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn straight_approach_interpolates_both_axes() {
        let s = start();
        let target = ChartPoint::new(55.0, 0.009);
        let end = approach(&s, Approach::Straight(target), 0.5).unwrap();
        assert!((end.dry_bulb() - 75.0).abs() < 1e-9);
        assert!((end.humidity_ratio() - (s.humidity_ratio() + 0.009) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn effectiveness_bounds() {
        assert!(check_effectiveness(0.85).is_ok());
        assert!(check_effectiveness(-0.1).is_err());
        assert!(check_effectiveness(1.5).is_err());
    }
}
