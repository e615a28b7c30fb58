//! Surface condensation check against the air's dew point.

use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, finite};
use crate::state::{AirState, StateSpec};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CondensationParams {
    pub state: StateSpec,
    pub surface_temperature: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CondensationCheck {
    pub is_condensing: bool,
    pub surface_temperature: f64,
    pub dew_point: f64,
    /// Surface minus dew point; negative when condensing.
    pub margin: f64,
}

/// Condensation forms when the surface is strictly colder than the dew point.
pub fn check_condensation(state: &AirState, surface_temperature: f64) -> EngineResult<CondensationCheck> {
    finite("surface_temperature", surface_temperature)?;
    let dew_point = state.dew_point();
    Ok(CondensationCheck {
        is_condensing: surface_temperature < dew_point,
        surface_temperature,
        dew_point,
        margin: surface_temperature - dew_point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::UnitSystem;

    use crate::conditions::Conditions;
    use crate::resolver::resolve;
    use crate::state::Property;

    fn room() -> AirState {
        resolve(
            &Conditions::sea_level(UnitSystem::Ip),
            (Property::DryBulb, 75.0),
            (Property::DewPoint, 55.0),
        )
        .unwrap()
    }

    #[test]
    fn cold_surface_condenses() {
        let c = check_condensation(&room(), 50.0).unwrap();
        assert!(c.is_condensing);
        assert!((c.dew_point - 55.0).abs() < 1e-6);
        assert!((c.margin + 5.0).abs() < 1e-6);
    }

    #[test]
    fn surface_at_dew_point_is_dry() {
        let state = room();
        let c = check_condensation(&state, state.dew_point()).unwrap();
        assert!(!c.is_condensing);
        assert_eq!(c.margin, 0.0);
        assert!(check_condensation(&state, f64::INFINITY).is_err());
    }
}
