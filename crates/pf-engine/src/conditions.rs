//! Unit system and barometric pressure shared by every computation.

use pf_core::units::{Length, Pressure};
use pf_core::UnitSystem;
use pf_props::{Psychrometrics, standard_pressure};
use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// Validated unit system + barometric pressure (psia or Pa).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Conditions {
    units: UnitSystem,
    pressure: f64,
}

impl Conditions {
    pub fn new(units: UnitSystem, pressure: f64) -> EngineResult<Self> {
        if !pressure.is_finite() || pressure <= 0.0 {
            return Err(EngineError::invalid(
                "pressure",
                format!("{pressure} must be positive and finite"),
            ));
        }
        Ok(Self { units, pressure })
    }

    /// Standard sea-level pressure.
    pub fn sea_level(units: UnitSystem) -> Self {
        Self {
            units,
            pressure: units.sea_level_pressure(),
        }
    }

    /// Standard-atmosphere pressure at `altitude` (ft for IP, m for SI).
    pub fn from_altitude(units: UnitSystem, altitude: f64) -> EngineResult<Self> {
        let pressure = standard_pressure(units, altitude)
            .map_err(|_| EngineError::invalid("altitude", format!("{altitude} is outside the standard atmosphere")))?;
        Self::new(units, pressure)
    }

    /// Typed altitude converted into the unit system's length unit.
    pub fn from_typed_altitude(units: UnitSystem, altitude: Length) -> EngineResult<Self> {
        Self::from_altitude(units, units.altitude_value(altitude))
    }

    /// Typed pressure converted into the unit system's pressure unit.
    pub fn from_pressure(units: UnitSystem, pressure: Pressure) -> EngineResult<Self> {
        Self::new(units, units.pressure_value(pressure))
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn pressure_quantity(&self) -> Pressure {
        self.units.pressure_quantity(self.pressure)
    }

    /// Property adapter for this unit system.
    pub fn psychrometrics(&self) -> Psychrometrics {
        Psychrometrics::new(self.units)
    }
}
