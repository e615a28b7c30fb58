//! Steam, adiabatic (spray/media) and heated-water humidification.

use pf_solver::find_root;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::effectiveness::{Approach, approach, check_effectiveness};
use crate::error::{EngineError, EngineResult, finite};
use crate::path::{STRAIGHT_SEGMENTS, WET_BULB_SEGMENTS, constant_wet_bulb, straight_between};
use crate::process::{ProcessKind, ProcessResult, ProcessSolver, Warnings};
use crate::resolver::{resolve, resolve_saturated};
use crate::state::{AirState, Property};

fn check_target_rh(rh: f64) -> EngineResult<f64> {
    if rh.is_finite() && rh > 0.0 && rh <= 1.0 {
        Ok(rh)
    } else {
        Err(EngineError::invalid("target_relative_humidity", format!("{rh} must be in (0, 1]")))
    }
}

fn with_deltas(result: ProcessResult) -> ProcessResult {
    let (dt, dw, dh) = (
        result.end.dry_bulb() - result.start.dry_bulb(),
        result.end.humidity_ratio() - result.start.humidity_ratio(),
        result.end.enthalpy() - result.start.enthalpy(),
    );
    let (rh0, rh1) = (result.start.relative_humidity(), result.end.relative_humidity());
    result
        .with_meta("delta_t", dt)
        .with_meta("delta_w", dw)
        .with_meta("delta_h", dh)
        .with_meta("start_relative_humidity", rh0)
        .with_meta("end_relative_humidity", rh1)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteamTarget {
    RelativeHumidity(f64),
    HumidityRatio(f64),
}

/// Steam injection at constant dry bulb.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SteamParams {
    pub target: SteamTarget,
}

impl ProcessSolver for SteamParams {
    fn validate(&self) -> EngineResult<()> {
        match self.target {
            SteamTarget::RelativeHumidity(rh) => {
                check_target_rh(rh)?;
            }
            SteamTarget::HumidityRatio(w) => {
                if !w.is_finite() || w < 0.0 {
                    return Err(EngineError::invalid("target_humidity_ratio", format!("{w} must be non-negative")));
                }
            }
        }
        Ok(())
    }

    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult> {
        let conditions = start.conditions();
        let target = match self.target {
            SteamTarget::RelativeHumidity(rh) => (Property::RelativeHumidity, rh),
            SteamTarget::HumidityRatio(w) => (Property::HumidityRatio, w),
        };
        let end = resolve(&conditions, (Property::DryBulb, start.dry_bulb()), target)?;

        let mut warnings = Warnings::new();
        if end.humidity_ratio() < start.humidity_ratio() {
            warnings.push(format!(
                "End humidity ratio {:.6} is below the start {:.6}; this is dehumidification",
                end.humidity_ratio(),
                start.humidity_ratio()
            ));
        }
        let w_sat = conditions
            .psychrometrics()
            .sat_hum_ratio(start.dry_bulb(), conditions.pressure())?;
        if end.humidity_ratio() > w_sat * 1.001 {
            warnings.push(format!(
                "Target humidity ratio exceeds saturation at {:.1}; fog would form",
                start.dry_bulb()
            ));
        }

        let path = straight_between(start, &end, STRAIGHT_SEGMENTS);
        Ok(with_deltas(ProcessResult::new(ProcessKind::SteamHumidification, start.clone(), end, path)).with_warnings(warnings))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdiabaticMode {
    Effectiveness(f64),
    /// Leaving RH, reached along the entering wet-bulb line.
    TargetRelativeHumidity(f64),
}

/// Evaporation of recirculated water along the constant wet-bulb line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdiabaticHumidificationParams {
    pub mode: AdiabaticMode,
}

impl ProcessSolver for AdiabaticHumidificationParams {
    fn validate(&self) -> EngineResult<()> {
        match self.mode {
            AdiabaticMode::Effectiveness(e) => {
                check_effectiveness(e)?;
            }
            AdiabaticMode::TargetRelativeHumidity(rh) => {
                check_target_rh(rh)?;
            }
        }
        Ok(())
    }

    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult> {
        let wet_bulb = start.wet_bulb();
        let span = start.dry_bulb() - wet_bulb;
        let (end, effectiveness) = match self.mode {
            AdiabaticMode::Effectiveness(e) => (approach(start, Approach::WetBulb(wet_bulb), e)?, e),
            AdiabaticMode::TargetRelativeHumidity(rh) => {
                if rh <= start.relative_humidity() {
                    return Err(EngineError::invalid(
                        "target_relative_humidity",
                        format!(
                            "{rh:.4} must exceed the current relative humidity {:.4}",
                            start.relative_humidity()
                        ),
                    ));
                }
                let tdb = dry_bulb_at_rh_on_wet_bulb(start, rh)?;
                let e = if span.abs() > 1e-10 { (start.dry_bulb() - tdb) / span } else { 1.0 };
                let end = resolve(
                    &start.conditions(),
                    (Property::DryBulb, tdb),
                    (Property::WetBulb, wet_bulb),
                )?;
                (end, e)
            }
        };

        let path = constant_wet_bulb(start, &end, wet_bulb, WET_BULB_SEGMENTS)?;
        Ok(
            with_deltas(ProcessResult::new(ProcessKind::AdiabaticHumidification, start.clone(), end, path))
                .with_meta("effectiveness", effectiveness)
                .with_meta("wet_bulb", wet_bulb),
        )
    }
}

/// Dry bulb on the start's wet-bulb line where RH equals `rh`, between the
/// wet bulb (saturated) and the start dry bulb.
fn dry_bulb_at_rh_on_wet_bulb(start: &AirState, rh: f64) -> EngineResult<f64> {
    let wet_bulb = start.wet_bulb();
    if rh >= 1.0 {
        return Ok(wet_bulb);
    }
    let psy = start.conditions().psychrometrics();
    let p = start.pressure();
    let root = find_root(
        |tdb| -> EngineResult<f64> {
            let w = psy.hum_ratio_from_wet_bulb(tdb, wet_bulb, p)?;
            Ok(psy.rel_hum_from_hum_ratio(tdb, w, p)? - rh)
        },
        wet_bulb,
        start.dry_bulb(),
        psy.root_config(),
    )?;
    trace!(dry_bulb = root.x, iterations = root.iterations, "target RH on wet-bulb line");
    Ok(root.x.max(wet_bulb))
}

/// Spray of heated water; the air moves straight toward saturation at the
/// water temperature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatedWaterParams {
    pub effectiveness: f64,
    pub water_temperature: f64,
}

impl ProcessSolver for HeatedWaterParams {
    fn validate(&self) -> EngineResult<()> {
        check_effectiveness(self.effectiveness)?;
        finite("water_temperature", self.water_temperature)?;
        Ok(())
    }

    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult> {
        let saturated = resolve_saturated(&start.conditions(), self.water_temperature)?;
        let end = approach(start, Approach::Straight(saturated.chart_point()), self.effectiveness)?;

        let mut warnings = Warnings::new();
        if end.humidity_ratio() < start.humidity_ratio() {
            warnings.push("End humidity ratio is below the start; the water may be too cold to humidify");
        }

        let path = straight_between(start, &end, STRAIGHT_SEGMENTS);
        Ok(
            with_deltas(ProcessResult::new(ProcessKind::HeatedWaterHumidification, start.clone(), end, path))
                .with_meta("effectiveness", self.effectiveness)
                .with_meta("water_temperature", self.water_temperature)
                .with_meta("saturated_water", saturated)
                .with_warnings(warnings),
        )
    }
}
