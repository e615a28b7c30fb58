//! Cooling coil analysis: the coil line solution plus load arithmetic and
//! chilled-water flow.

use pf_core::UnitSystem;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult, finite};
use crate::path::{PathPoint, STRAIGHT_SEGMENTS, straight_between};
use crate::process::cooling_dehum::{self, CoolingMode, UnitLoads, unit_loads};
use crate::state::AirState;

const MIN_WATER_DELTA: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoilParams {
    pub mode: CoolingMode,
    /// Volumetric airflow (cfm or m³/s); loads are per unit mass without it.
    #[serde(default)]
    pub airflow: Option<f64>,
    #[serde(default)]
    pub water_entering: Option<f64>,
    #[serde(default)]
    pub water_leaving: Option<f64>,
}

impl CoilParams {
    pub fn validate(&self) -> EngineResult<()> {
        self.mode.validate()?;
        if let Some(v) = self.airflow {
            if !v.is_finite() || v < 0.0 {
                return Err(EngineError::invalid("airflow", format!("{v} must be non-negative")));
            }
        }
        if let Some(t) = self.water_entering {
            finite("water_entering", t)?;
        }
        if let Some(t) = self.water_leaving {
            finite("water_leaving", t)?;
        }
        Ok(())
    }
}

/// Coil loads in `unit`: BTU/lb or kJ/kg without airflow, BTU/hr or W with it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoilLoads {
    pub sensible: f64,
    pub latent: f64,
    pub total: f64,
    pub shr: f64,
    pub unit: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoilResult {
    pub entering: AirState,
    pub leaving: AirState,
    pub adp: AirState,
    pub bypass_factor: f64,
    /// Always `1 − bypass_factor`.
    pub contact_factor: f64,
    pub loads: CoilLoads,
    /// gpm (IP) or L/s (SI).
    pub water_flow: Option<f64>,
    pub path: Vec<PathPoint>,
    pub warnings: Vec<String>,
}

/// Forward or reverse coil analysis from a resolved entering state.
pub fn analyze_coil(entering: &AirState, params: &CoilParams) -> EngineResult<CoilResult> {
    params.validate()?;
    let solution = cooling_dehum::solve(entering, &params.mode)?;
    let per_mass = unit_loads(entering, &solution.leaving);
    let loads = scale_loads(entering, &solution.leaving, per_mass, params.airflow);
    let water_flow = water_flow(entering.units(), &loads, params);
    debug!(
        bypass_factor = solution.bypass_factor,
        total = loads.total,
        unit = loads.unit,
        "coil analyzed"
    );

    Ok(CoilResult {
        path: straight_between(entering, &solution.leaving, STRAIGHT_SEGMENTS),
        entering: entering.clone(),
        leaving: solution.leaving,
        adp: solution.adp,
        bypass_factor: solution.bypass_factor,
        contact_factor: 1.0 - solution.bypass_factor,
        loads,
        water_flow,
        warnings: solution.warnings.into_vec(),
    })
}

/// Absolute loads from airflow at the entering density, else per unit mass.
fn scale_loads(entering: &AirState, leaving: &AirState, per_mass: UnitLoads, airflow: Option<f64>) -> CoilLoads {
    let units = entering.units();
    let airflow = match airflow {
        Some(v) if v > 0.0 => v,
        _ => {
            return CoilLoads {
                sensible: per_mass.sensible,
                latent: per_mass.latent,
                total: per_mass.total,
                shr: per_mass.shr,
                unit: units.enthalpy_unit(),
            };
        }
    };

    let rho = entering.density();
    let cp = entering.conditions().psychrometrics().cp_moist_air();
    let dt = entering.dry_bulb() - leaving.dry_bulb();
    let dh = entering.enthalpy() - leaving.enthalpy();
    let (sensible, total) = match units {
        UnitSystem::Ip => (60.0 * rho * cp * airflow * dt, 4.5 * airflow * dh),
        UnitSystem::Si => {
            let mass_flow = rho * airflow;
            (mass_flow * cp * dt * 1000.0, mass_flow * dh * 1000.0)
        }
    };
    CoilLoads {
        sensible,
        latent: total - sensible,
        total,
        shr: per_mass.shr,
        unit: units.load_unit(),
    }
}

/// Water flow from the absolute total load; needs airflow and both water
/// temperatures at least 0.01° apart.
fn water_flow(units: UnitSystem, loads: &CoilLoads, params: &CoilParams) -> Option<f64> {
    let (entering, leaving) = (params.water_entering?, params.water_leaving?);
    if !params.airflow.is_some_and(|v| v > 0.0) {
        return None;
    }
    let dt = (leaving - entering).abs();
    if dt < MIN_WATER_DELTA {
        return None;
    }
    Some(match units {
        UnitSystem::Ip => loads.total / (500.0 * dt),
        UnitSystem::Si => loads.total / (4186.0 * dt),
    })
}
