//! Closed-form moist-air relations and their bracketed inverses.

use pf_core::UnitSystem;
use pf_solver::{RootConfig, find_root};
use tracing::trace;

use crate::error::{PropsError, PropsResult};
use crate::saturation::{self, absolute, freezing_point};

/// Floor on the humidity ratio behind a dew point; bone-dry air has none.
pub const MIN_HUM_RATIO: f64 = 1e-7;

/// Ratio of the molecular weights of water and dry air.
const MW_RATIO: f64 = 0.621945;

/// Ratio of the gas constants of water vapor and dry air.
const R_RATIO: f64 = 1.607858;

/// Moist-air property adapter for one unit system.
///
/// IP: °F, psia, lb/lb, BTU/lb, ft³/lb. SI: °C, Pa, kg/kg, kJ/kg, m³/kg.
/// Values are cheap to copy and carry no mutable state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Psychrometrics {
    units: UnitSystem,
    root: RootConfig,
}

impl Psychrometrics {
    pub fn new(units: UnitSystem) -> Self {
        Self {
            units,
            root: RootConfig::default(),
        }
    }

    /// Adapter using a custom iteration budget for its inverse relations.
    pub fn with_root_config(units: UnitSystem, root: RootConfig) -> Self {
        Self { units, root }
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn root_config(&self) -> &RootConfig {
        &self.root
    }

    /// Specific heat of dry air (BTU/lb·°F or kJ/kg·K).
    pub fn cp_dry_air(&self) -> f64 {
        match self.units {
            UnitSystem::Ip => 0.240,
            UnitSystem::Si => 1.006,
        }
    }

    /// Specific heat of water vapor (BTU/lb·°F or kJ/kg·K).
    pub fn cp_vapor(&self) -> f64 {
        match self.units {
            UnitSystem::Ip => 0.444,
            UnitSystem::Si => 1.86,
        }
    }

    /// Humid specific heat used for sensible load arithmetic.
    pub fn cp_moist_air(&self) -> f64 {
        match self.units {
            UnitSystem::Ip => 0.244,
            UnitSystem::Si => 1.006,
        }
    }

    /// Latent heat of vaporization at the enthalpy datum (BTU/lb or kJ/kg).
    pub fn hfg(&self) -> f64 {
        match self.units {
            UnitSystem::Ip => 1061.0,
            UnitSystem::Si => 2501.0,
        }
    }

    /// Validates a dry-bulb (or wet-bulb, dew-point) temperature against the
    /// correlation domain.
    pub fn check_temperature(&self, t: f64, what: &'static str) -> PropsResult<f64> {
        let (lo, hi) = self.units.temperature_domain();
        if !t.is_finite() || t < lo || t > hi {
            return Err(PropsError::OutOfRange { what, value: t });
        }
        Ok(t)
    }

    pub fn check_pressure(&self, p: f64) -> PropsResult<f64> {
        if !p.is_finite() || p <= 0.0 {
            return Err(PropsError::OutOfRange {
                what: "pressure",
                value: p,
            });
        }
        Ok(p)
    }

    fn check_hum_ratio(&self, w: f64) -> PropsResult<f64> {
        if !w.is_finite() || w < 0.0 {
            return Err(PropsError::OutOfRange {
                what: "humidity ratio",
                value: w,
            });
        }
        Ok(w)
    }

    pub fn sat_vapor_pressure(&self, t_dry_bulb: f64) -> PropsResult<f64> {
        saturation::sat_vapor_pressure(self.units, t_dry_bulb)
    }

    /// Humidity ratio of saturated air.
    pub fn sat_hum_ratio(&self, t_dry_bulb: f64, pressure: f64) -> PropsResult<f64> {
        let pws = self.sat_vapor_pressure(t_dry_bulb)?;
        self.hum_ratio_from_vapor_pressure(pws, pressure)
    }

    pub fn hum_ratio_from_vapor_pressure(&self, pv: f64, pressure: f64) -> PropsResult<f64> {
        self.check_pressure(pressure)?;
        if !pv.is_finite() || pv < 0.0 {
            return Err(PropsError::OutOfRange {
                what: "vapor pressure",
                value: pv,
            });
        }
        if pv >= pressure {
            return Err(PropsError::NonPhysical {
                what: "vapor pressure at or above barometric pressure",
            });
        }
        Ok(MW_RATIO * pv / (pressure - pv))
    }

    pub fn vapor_pressure_from_hum_ratio(&self, w: f64, pressure: f64) -> PropsResult<f64> {
        self.check_pressure(pressure)?;
        let w = self.check_hum_ratio(w)?;
        Ok(pressure * w / (MW_RATIO + w))
    }

    pub fn hum_ratio_from_rel_hum(&self, t_dry_bulb: f64, rh: f64, pressure: f64) -> PropsResult<f64> {
        if !(0.0..=1.0).contains(&rh) {
            return Err(PropsError::OutOfRange {
                what: "relative humidity",
                value: rh,
            });
        }
        let pv = rh * self.sat_vapor_pressure(t_dry_bulb)?;
        self.hum_ratio_from_vapor_pressure(pv, pressure)
    }

    pub fn rel_hum_from_hum_ratio(&self, t_dry_bulb: f64, w: f64, pressure: f64) -> PropsResult<f64> {
        let pv = self.vapor_pressure_from_hum_ratio(w, pressure)?;
        Ok(pv / self.sat_vapor_pressure(t_dry_bulb)?)
    }

    pub fn hum_ratio_from_dew_point(&self, t_dew_point: f64, pressure: f64) -> PropsResult<f64> {
        let pv = self.sat_vapor_pressure(t_dew_point)?;
        self.hum_ratio_from_vapor_pressure(pv, pressure)
    }

    /// Dew point from vapor pressure, capped at the dry bulb.
    ///
    /// Solves `ln Pws(Tdp) = ln Pv` between the correlation floor and `t_dry_bulb`.
    pub fn dew_point_from_vapor_pressure(&self, t_dry_bulb: f64, pv: f64) -> PropsResult<f64> {
        self.check_temperature(t_dry_bulb, "dry-bulb temperature")?;
        if !pv.is_finite() || pv <= 0.0 {
            return Err(PropsError::OutOfRange {
                what: "vapor pressure",
                value: pv,
            });
        }

        let ln_pv = pv.ln();
        if ln_pv >= saturation::ln_sat_vapor_pressure(self.units, t_dry_bulb)? {
            return Ok(t_dry_bulb);
        }
        let (t_min, _) = self.units.temperature_domain();
        if ln_pv < saturation::ln_sat_vapor_pressure(self.units, t_min)? {
            return Err(PropsError::OutOfRange {
                what: "vapor pressure below correlation range",
                value: pv,
            });
        }

        let units = self.units;
        let root = find_root(
            |t: f64| -> PropsResult<f64> { Ok(saturation::ln_sat_vapor_pressure(units, t)? - ln_pv) },
            t_min,
            t_dry_bulb,
            &self.root,
        )?;
        trace!(t_dew_point = root.x, iterations = root.iterations, "dew point solved");
        Ok(root.x.min(t_dry_bulb))
    }

    /// Dew point, with `w` floored at [`MIN_HUM_RATIO`].
    pub fn dew_point_from_hum_ratio(&self, t_dry_bulb: f64, w: f64, pressure: f64) -> PropsResult<f64> {
        let w = self.check_hum_ratio(w)?.max(MIN_HUM_RATIO);
        let pv = self.vapor_pressure_from_hum_ratio(w, pressure)?;
        self.dew_point_from_vapor_pressure(t_dry_bulb, pv)
    }

    /// Humidity ratio from the psychrometric wet-bulb relation.
    ///
    /// Uses the ice-surface form when the wet bulb is below freezing. A wet
    /// bulb below that of bone-dry air gives zero.
    pub fn hum_ratio_from_wet_bulb(&self, t_dry_bulb: f64, t_wet_bulb: f64, pressure: f64) -> PropsResult<f64> {
        Ok(self.wet_bulb_relation(t_dry_bulb, t_wet_bulb, pressure)?.max(0.0))
    }

    /// The wet-bulb relation itself, negative below the bone-dry wet bulb.
    fn wet_bulb_relation(&self, t_dry_bulb: f64, t_wet_bulb: f64, pressure: f64) -> PropsResult<f64> {
        self.check_temperature(t_dry_bulb, "dry-bulb temperature")?;
        self.check_temperature(t_wet_bulb, "wet-bulb temperature")?;
        if t_wet_bulb > t_dry_bulb {
            return Err(PropsError::OutOfRange {
                what: "wet-bulb temperature above dry bulb",
                value: t_wet_bulb,
            });
        }

        let ws_star = self.sat_hum_ratio(t_wet_bulb, pressure)?;
        let (tdb, twb) = (t_dry_bulb, t_wet_bulb);
        let frozen = twb < freezing_point(self.units);
        let w = match (self.units, frozen) {
            (UnitSystem::Ip, false) => {
                ((1093.0 - 0.556 * twb) * ws_star - 0.240 * (tdb - twb))
                    / (1093.0 + 0.444 * tdb - twb)
            }
            (UnitSystem::Ip, true) => {
                ((1220.0 - 0.04 * twb) * ws_star - 0.240 * (tdb - twb))
                    / (1220.0 + 0.444 * tdb - 0.48 * twb)
            }
            (UnitSystem::Si, false) => {
                ((2501.0 - 2.326 * twb) * ws_star - 1.006 * (tdb - twb))
                    / (2501.0 + 1.86 * tdb - 4.186 * twb)
            }
            (UnitSystem::Si, true) => {
                ((2830.0 - 0.24 * twb) * ws_star - 1.006 * (tdb - twb))
                    / (2830.0 + 1.86 * tdb - 2.1 * twb)
            }
        };
        Ok(w)
    }

    /// Wet bulb from dry bulb and humidity ratio.
    ///
    /// Saturated or supersaturated air returns the dry bulb.
    pub fn wet_bulb_from_hum_ratio(&self, t_dry_bulb: f64, w: f64, pressure: f64) -> PropsResult<f64> {
        let w = self.check_hum_ratio(w)?;
        let t_dew_point = self.dew_point_from_hum_ratio(t_dry_bulb, w, pressure)?;
        let (t_min, _) = self.units.temperature_domain();

        let residual =
            |twb: f64| -> PropsResult<f64> { Ok(self.wet_bulb_relation(t_dry_bulb, twb, pressure)? - w) };

        if residual(t_dry_bulb)? <= 0.0 {
            return Ok(t_dry_bulb);
        }
        let mut lower = (t_dew_point - 1.0).max(t_min);
        if residual(lower)? >= 0.0 {
            lower = t_min;
        }
        let root = find_root(residual, lower, t_dry_bulb, &self.root)?;
        trace!(t_wet_bulb = root.x, iterations = root.iterations, "wet bulb solved");
        Ok(root.x)
    }

    pub fn wet_bulb_from_rel_hum(&self, t_dry_bulb: f64, rh: f64, pressure: f64) -> PropsResult<f64> {
        let w = self.hum_ratio_from_rel_hum(t_dry_bulb, rh, pressure)?;
        self.wet_bulb_from_hum_ratio(t_dry_bulb, w, pressure)
    }

    /// Moist-air enthalpy per unit mass of dry air (BTU/lb or kJ/kg).
    pub fn enthalpy(&self, t_dry_bulb: f64, w: f64) -> PropsResult<f64> {
        let w = self.check_hum_ratio(w)?;
        Ok(self.cp_dry_air() * t_dry_bulb + w * (self.hfg() + self.cp_vapor() * t_dry_bulb))
    }

    /// Inverse of [`Self::enthalpy`] at fixed humidity ratio.
    pub fn dry_bulb_from_enthalpy(&self, h: f64, w: f64) -> PropsResult<f64> {
        let w = self.check_hum_ratio(w)?;
        if !h.is_finite() {
            return Err(PropsError::OutOfRange {
                what: "enthalpy",
                value: h,
            });
        }
        Ok((h - self.hfg() * w) / (self.cp_dry_air() + self.cp_vapor() * w))
    }

    /// Specific volume per unit mass of dry air (ft³/lb or m³/kg).
    pub fn specific_volume(&self, t_dry_bulb: f64, w: f64, pressure: f64) -> PropsResult<f64> {
        self.check_pressure(pressure)?;
        let w = self.check_hum_ratio(w)?;
        let t = absolute(self.units, t_dry_bulb);
        let v = match self.units {
            UnitSystem::Ip => 53.350 * t * (1.0 + R_RATIO * w) / (144.0 * pressure),
            UnitSystem::Si => 287.042 * t * (1.0 + R_RATIO * w) / pressure,
        };
        Ok(v)
    }

    /// Ratio of the humidity ratio to that of saturated air at the same dry bulb.
    pub fn degree_of_saturation(&self, t_dry_bulb: f64, w: f64, pressure: f64) -> PropsResult<f64> {
        let w = self.check_hum_ratio(w)?;
        Ok(w / self.sat_hum_ratio(t_dry_bulb, pressure)?)
    }
}
