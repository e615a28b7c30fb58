//! Sensible heating, cooling and reheat at constant humidity ratio.

use serde::{Deserialize, Serialize};

use crate::airflow::{LoadKind, c_factor};
use crate::error::{EngineError, EngineResult, finite};
use crate::path::{STRAIGHT_SEGMENTS, straight_between};
use crate::process::{ProcessKind, ProcessResult, ProcessSolver, Warnings};
use crate::resolver::resolve_dry_bulb_hum_ratio;
use crate::state::AirState;

/// How the leaving dry bulb is specified.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensibleMode {
    TargetDryBulb(f64),
    DeltaT(f64),
    /// Sensible load (BTU/hr or W) and volumetric airflow (cfm or m³/s).
    HeatAndAirflow { load: f64, airflow: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensibleParams {
    pub mode: SensibleMode,
    /// Report the result as reheat regardless of direction.
    #[serde(default)]
    pub reheat: bool,
}

impl ProcessSolver for SensibleParams {
    fn validate(&self) -> EngineResult<()> {
        match self.mode {
            SensibleMode::TargetDryBulb(t) => {
                finite("target_dry_bulb", t)?;
            }
            SensibleMode::DeltaT(dt) => {
                finite("delta_t", dt)?;
            }
            SensibleMode::HeatAndAirflow { load, airflow } => {
                finite("load", load)?;
                if !airflow.is_finite() || airflow <= 0.0 {
                    return Err(EngineError::invalid("airflow", format!("{airflow} must be positive")));
                }
            }
        }
        Ok(())
    }

    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult> {
        let (end_dry_bulb, heat) = match self.mode {
            SensibleMode::TargetDryBulb(t) => (t, None),
            SensibleMode::DeltaT(dt) => (start.dry_bulb() + dt, None),
            SensibleMode::HeatAndAirflow { load, airflow } => {
                let conditions = start.conditions();
                let (c, _) = c_factor(LoadKind::Sensible, start.dry_bulb(), start.humidity_ratio(), &conditions)?;
                (start.dry_bulb() + load / (c * airflow), Some((load, airflow, c)))
            }
        };

        let mut result = to_dry_bulb(start, end_dry_bulb, self.reheat)?;
        if let Some((load, airflow, c)) = heat {
            result = result
                .with_meta("q_sensible", load)
                .with_meta("airflow", airflow)
                .with_meta("c_factor", c);
        }
        Ok(result)
    }
}

/// Moves `start` to `end_dry_bulb` holding the humidity ratio exactly.
pub fn to_dry_bulb(start: &AirState, end_dry_bulb: f64, reheat: bool) -> EngineResult<ProcessResult> {
    let mut warnings = Warnings::new();
    if end_dry_bulb < start.dew_point() {
        warnings.push(format!(
            "Target dry bulb {end_dry_bulb:.1} is below the entering dew point {:.1}; \
             a real coil would remove moisture, consider cooling & dehumidification",
            start.dew_point()
        ));
    }

    let end = resolve_dry_bulb_hum_ratio(&start.conditions(), end_dry_bulb, start.humidity_ratio())?;
    let kind = if reheat {
        ProcessKind::SensibleReheat
    } else if end.dry_bulb() >= start.dry_bulb() {
        ProcessKind::SensibleHeating
    } else {
        ProcessKind::SensibleCooling
    };

    let path = straight_between(start, &end, STRAIGHT_SEGMENTS);
    let delta_t = end.dry_bulb() - start.dry_bulb();
    let q = end.enthalpy() - start.enthalpy();
    Ok(ProcessResult::new(kind, start.clone(), end, path)
        .with_meta("delta_t", delta_t)
        .with_meta("q_per_unit_mass", q)
        .with_warnings(warnings))
}
