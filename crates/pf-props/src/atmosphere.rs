//! ASHRAE standard atmosphere.

use pf_core::UnitSystem;

use crate::error::{PropsError, PropsResult};

/// Barometric pressure at `altitude` (ft for IP, m for SI), in psia or Pa.
pub fn standard_pressure(units: UnitSystem, altitude: f64) -> PropsResult<f64> {
    if !altitude.is_finite() {
        return Err(PropsError::OutOfRange {
            what: "altitude",
            value: altitude,
        });
    }
    let base = match units {
        UnitSystem::Ip => 1.0 - 6.8754e-6 * altitude,
        UnitSystem::Si => 1.0 - 2.25577e-5 * altitude,
    };
    if base <= 0.0 {
        return Err(PropsError::OutOfRange {
            what: "altitude",
            value: altitude,
        });
    }
    Ok(units.sea_level_pressure() * base.powf(5.2559))
}
