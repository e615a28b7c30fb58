//! Air-handling unit chain: outdoor air, optional return-air mixing, the
//! cooling coil and reheat, composed from the process solvers.

use pf_core::UnitSystem;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::airflow::{LoadKind, c_factor};
use crate::conditions::Conditions;
use crate::error::{EngineError, EngineResult, finite, unit_fraction};
use crate::path::{STRAIGHT_SEGMENTS, straight_between};
use crate::process::cooling_dehum::{self, UnitLoads, unit_loads};
use crate::process::sensible::to_dry_bulb;
use crate::process::{ProcessKind, ProcessResult, StreamFlow, Warnings, mix};
use crate::resolver::{resolve, resolve_dry_bulb_hum_ratio};
use crate::state::{AirState, Property, StateSpec};

/// Coil leaving RH assumed when dehumidification is implied but not specified.
pub const ASSUMED_COIL_LEAVING_RH: f64 = 0.9;

/// Coil leaving this far below the supply target triggers reheat.
const REHEAT_THRESHOLD: f64 = 0.1;

const MIN_ROOM_DELTA_T: f64 = 0.1;
const SENSIBLE_ONLY_W: f64 = 1e-7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AhuKind {
    FullOutdoorAir,
    MixedAir,
    Economizer,
}

impl AhuKind {
    fn mixes_return_air(self) -> bool {
        !matches!(self, AhuKind::FullOutdoorAir)
    }
}

/// Moisture coincident with the outdoor dry bulb.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutdoorMoisture {
    RelativeHumidity(f64),
    WetBulb(f64),
}

impl OutdoorMoisture {
    fn property(self) -> (Property, f64) {
        match self {
            OutdoorMoisture::RelativeHumidity(rh) => (Property::RelativeHumidity, rh),
            OutdoorMoisture::WetBulb(t) => (Property::WetBulb, t),
        }
    }
}

/// Airflows in cfm (IP) or m³/s (SI); loads in BTU/hr or W.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AhuParams {
    pub kind: AhuKind,
    pub outdoor_dry_bulb: f64,
    pub outdoor_moisture: OutdoorMoisture,
    #[serde(default)]
    pub return_air: Option<StateSpec>,
    #[serde(default)]
    pub oa_fraction: Option<f64>,
    #[serde(default)]
    pub oa_airflow: Option<f64>,
    #[serde(default)]
    pub ra_airflow: Option<f64>,
    pub supply_dry_bulb: f64,
    #[serde(default)]
    pub supply_rh: Option<f64>,
    /// Coil leaving dry bulb when the coil overcools for moisture removal;
    /// defaults to the supply target.
    #[serde(default)]
    pub coil_leaving_dry_bulb: Option<f64>,
    #[serde(default)]
    pub room_sensible_load: Option<f64>,
    #[serde(default)]
    pub total_airflow: Option<f64>,
}

impl AhuParams {
    pub fn validate(&self) -> EngineResult<()> {
        finite("outdoor_dry_bulb", self.outdoor_dry_bulb)?;
        let (p, v) = self.outdoor_moisture.property();
        finite(p.field_name(), v)?;
        finite("supply_dry_bulb", self.supply_dry_bulb)?;
        if let Some(rh) = self.supply_rh {
            if !(rh > 0.0 && rh <= 1.0) {
                return Err(EngineError::invalid("supply_rh", format!("{rh} must be in (0, 1]")));
            }
        }
        if let Some(t) = self.coil_leaving_dry_bulb {
            finite("coil_leaving_dry_bulb", t)?;
            if t > self.supply_dry_bulb {
                return Err(EngineError::invalid(
                    "coil_leaving_dry_bulb",
                    format!("{t} is above the supply target {}", self.supply_dry_bulb),
                ));
            }
        }
        if let Some(q) = self.room_sensible_load {
            finite("room_sensible_load", q)?;
        }
        for (field, flow) in [
            ("oa_airflow", self.oa_airflow),
            ("ra_airflow", self.ra_airflow),
            ("total_airflow", self.total_airflow),
        ] {
            if let Some(v) = flow {
                if !v.is_finite() || v < 0.0 {
                    return Err(EngineError::invalid(field, format!("{v} must be non-negative")));
                }
            }
        }
        if self.kind.mixes_return_air() {
            match &self.return_air {
                Some(ra) => {
                    ra.entries()?;
                }
                None => {
                    return Err(EngineError::invalid(
                        "return_air",
                        "required for mixed-air and economizer units",
                    ));
                }
            }
            self.resolved_oa_fraction()?;
        }
        Ok(())
    }

    /// OA fraction given directly or from the OA and RA airflows.
    fn resolved_oa_fraction(&self) -> EngineResult<f64> {
        let fraction = match (self.oa_fraction, self.oa_airflow, self.ra_airflow) {
            (Some(x), _, _) => x,
            (None, Some(oa), Some(ra)) => {
                let total = oa + ra;
                if total <= 0.0 {
                    return Err(EngineError::invalid("oa_airflow", "OA plus RA airflow must be positive"));
                }
                oa / total
            }
            _ => {
                return Err(EngineError::invalid(
                    "oa_fraction",
                    "give oa_fraction or both oa_airflow and ra_airflow",
                ));
            }
        };
        unit_fraction("oa_fraction", fraction)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AhuResult {
    pub kind: AhuKind,
    pub outdoor: AirState,
    pub return_air: Option<AirState>,
    pub mixed: Option<AirState>,
    pub coil_entering: AirState,
    pub coil_leaving: AirState,
    pub supply: AirState,
    pub oa_fraction: f64,
    /// Coil loads per unit mass.
    pub coil_loads: UnitLoads,
    pub adp: Option<AirState>,
    pub bypass_factor: Option<f64>,
    pub needs_reheat: bool,
    /// Reheat per unit mass.
    pub reheat_load: Option<f64>,
    pub supply_airflow: Option<f64>,
    /// Mixing, coil and reheat, in order of the air's travel.
    pub processes: Vec<ProcessResult>,
    pub warnings: Vec<String>,
}

pub fn analyze_ahu(conditions: &Conditions, params: &AhuParams) -> EngineResult<AhuResult> {
    params.validate()?;
    let mut warnings = Warnings::new();
    let mut processes = Vec::new();

    let outdoor = resolve(
        conditions,
        (Property::DryBulb, params.outdoor_dry_bulb),
        params.outdoor_moisture.property(),
    )?;

    let (return_air, mixed, oa_fraction) = match (&params.return_air, params.kind.mixes_return_air()) {
        (Some(ra), true) => {
            let ra = ra.resolve(conditions)?;
            let x = params.resolved_oa_fraction()?;
            let mixture = mix(&[(&outdoor, StreamFlow::Mass(x)), (&ra, StreamFlow::Mass(1.0 - x))])?;
            let result = ProcessResult::new(
                ProcessKind::AdiabaticMixing,
                outdoor.clone(),
                mixture.state.clone(),
                straight_between(&outdoor, &mixture.state, STRAIGHT_SEGMENTS),
            )
            .with_meta("oa_fraction", x)
            .with_meta("stream_2", ra.clone())
            .with_warnings(mixture.warnings);
            processes.push(result);
            (Some(ra), Some(mixture.state), x)
        }
        _ => (None, None, 1.0),
    };
    let entering = mixed.clone().unwrap_or_else(|| outdoor.clone());

    let supply_target = params.supply_dry_bulb;
    let mut adp = None;
    let mut bypass_factor = None;
    let coil_leaving = if entering.dry_bulb() <= supply_target {
        warnings.push(format!(
            "Entering air {:.1} is already at or below the supply target {supply_target:.1}; no cooling needed",
            entering.dry_bulb()
        ));
        entering.clone()
    } else {
        let leaving_dry_bulb = params.coil_leaving_dry_bulb.unwrap_or(supply_target);
        let target_w = coil_target_hum_ratio(conditions, &entering, params, &mut warnings)?;
        if entering.humidity_ratio() - target_w < SENSIBLE_ONLY_W {
            let result = to_dry_bulb(&entering, leaving_dry_bulb, false)?;
            let leaving = result.end.clone();
            processes.push(result);
            leaving
        } else {
            let psy = conditions.psychrometrics();
            let w_sat = psy.sat_hum_ratio(leaving_dry_bulb, conditions.pressure())?;
            if target_w > w_sat {
                return Err(EngineError::invalid(
                    "coil_leaving_dry_bulb",
                    format!("{leaving_dry_bulb} is too cold to hold the supply humidity ratio {target_w:.6}"),
                ));
            }
            let leaving = resolve_dry_bulb_hum_ratio(conditions, leaving_dry_bulb, target_w)?;
            let result = match cooling_dehum::solve_reverse(&entering, &leaving) {
                Ok(solution) => {
                    adp = Some(solution.adp.clone());
                    bypass_factor = Some(solution.bypass_factor);
                    cooling_dehum::into_result(&entering, solution)
                }
                Err(err) => {
                    debug!(%err, "coil ADP unavailable");
                    warnings.push(format!(
                        "Could not determine ADP/BF for the coil ({err}); loads are still valid"
                    ));
                    let loads = unit_loads(&entering, &leaving);
                    ProcessResult::new(
                        ProcessKind::CoolingDehumidification,
                        entering.clone(),
                        leaving.clone(),
                        straight_between(&entering, &leaving, STRAIGHT_SEGMENTS),
                    )
                    .with_meta("sensible", loads.sensible)
                    .with_meta("latent", loads.latent)
                    .with_meta("total", loads.total)
                    .with_meta("shr", loads.shr)
                }
            };
            processes.push(result);
            leaving
        }
    };

    let needs_reheat = coil_leaving.dry_bulb() < supply_target - REHEAT_THRESHOLD;
    let (supply, reheat_load) = if needs_reheat {
        let result = to_dry_bulb(&coil_leaving, supply_target, true)?;
        let supply = result.end.clone();
        let q = result.number("q_per_unit_mass");
        processes.push(result);
        (supply, q)
    } else {
        (coil_leaving.clone(), None)
    };

    let coil_loads = unit_loads(&entering, &coil_leaving);
    let supply_airflow = size_airflow(params, return_air.as_ref(), &supply, &mut warnings)?;
    debug!(
        kind = ?params.kind,
        oa_fraction,
        supply = supply.dry_bulb(),
        needs_reheat,
        "ahu analyzed"
    );

    Ok(AhuResult {
        kind: params.kind,
        outdoor,
        return_air,
        mixed,
        coil_entering: entering,
        coil_leaving,
        supply,
        oa_fraction,
        coil_loads,
        adp,
        bypass_factor,
        needs_reheat,
        reheat_load,
        supply_airflow,
        processes,
        warnings: warnings.into_vec(),
    })
}

/// Humidity ratio the coil must reach: the explicit supply RH, else the
/// assumed coil leaving RH when the entering dew point is above the supply
/// target, else unchanged.
fn coil_target_hum_ratio(
    conditions: &Conditions,
    entering: &AirState,
    params: &AhuParams,
    warnings: &mut Warnings,
) -> EngineResult<f64> {
    let psy = conditions.psychrometrics();
    let p = conditions.pressure();
    let supply = params.supply_dry_bulb;
    let target = match params.supply_rh {
        Some(rh) => psy.hum_ratio_from_rel_hum(supply, rh, p)?,
        None if entering.dew_point() > supply => {
            warnings.push(format!(
                "No supply RH given; assuming {:.0}% RH at the supply dry bulb",
                ASSUMED_COIL_LEAVING_RH * 100.0
            ));
            psy.hum_ratio_from_rel_hum(supply, ASSUMED_COIL_LEAVING_RH, p)?
        }
        None => return Ok(entering.humidity_ratio()),
    };
    if target > entering.humidity_ratio() {
        warnings.push(format!(
            "Supply humidity ratio {target:.6} is above the entering {:.6}; a cooling coil cannot add moisture, cooling sensibly",
            entering.humidity_ratio()
        ));
        return Ok(entering.humidity_ratio());
    }
    Ok(target)
}

/// Supply airflow: the given total, else sized from the room sensible load
/// against the return-air (room) dry bulb.
fn size_airflow(
    params: &AhuParams,
    return_air: Option<&AirState>,
    supply: &AirState,
    warnings: &mut Warnings,
) -> EngineResult<Option<f64>> {
    let Some(load) = params.room_sensible_load else {
        return Ok(None);
    };
    if params.total_airflow.is_some() {
        return Ok(params.total_airflow);
    }
    let room_dry_bulb = match return_air {
        Some(ra) => ra.dry_bulb(),
        None => default_room_dry_bulb(supply.units()),
    };
    let dt = room_dry_bulb - supply.dry_bulb();
    if dt.abs() <= MIN_ROOM_DELTA_T {
        warnings.push(format!(
            "Room and supply dry bulbs differ by only {dt:.2}; supply airflow not sized"
        ));
        return Ok(None);
    }
    let (c, _) = c_factor(
        LoadKind::Sensible,
        supply.dry_bulb(),
        supply.humidity_ratio(),
        &supply.conditions(),
    )?;
    Ok(Some(load / (c * dt)))
}

fn default_room_dry_bulb(units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Ip => 75.0,
        UnitSystem::Si => 24.0,
    }
}
