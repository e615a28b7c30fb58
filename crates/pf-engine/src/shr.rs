//! Sensible heat ratio lines and the grand/effective SHR analysis.

use pf_core::UnitSystem;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adp::line_saturation_intersection;
use crate::conditions::Conditions;
use crate::error::{EngineError, EngineResult, finite, open_fraction, unit_fraction};
use crate::path::{PathPoint, STRAIGHT_SEGMENTS, straight_between};
use crate::process::Warnings;
use crate::resolver::{resolve_dry_bulb_hum_ratio, resolve_saturated};
use crate::state::{AirState, StateSpec};

/// Lowest ratio a line is drawn for after clamping.
pub const MIN_LINE_SHR: f64 = 0.01;

/// Slope dW/dTdb of a line with sensible heat ratio `shr` in `(0, 1]`.
///
/// `SHR = cp·ΔT / (cp·ΔT + hfg·ΔW)`, so `ΔW/ΔT = cp·(1 − SHR) / (hfg·SHR)`.
pub fn shr_slope(units: UnitSystem, shr: f64) -> EngineResult<f64> {
    if !shr.is_finite() || shr <= 0.0 || shr > 1.0 {
        return Err(EngineError::invalid("shr", format!("{shr} must be in (0, 1]")));
    }
    if shr == 1.0 {
        return Ok(0.0);
    }
    let psy = pf_props::Psychrometrics::new(units);
    Ok(psy.cp_moist_air() * (1.0 - shr) / (psy.hfg() * shr))
}

/// Line of constant SHR from a state down to its apparatus dew point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShrLine {
    pub shr: f64,
    /// dW/dTdb.
    pub slope: f64,
    pub adp: AirState,
    /// From the state to the ADP.
    pub points: Vec<PathPoint>,
}

/// SHR line through `state`, intersected with saturation at or below its dry bulb.
///
/// SHR 1 is a horizontal line whose ADP is the dew point.
pub fn shr_line(state: &AirState, shr: f64) -> EngineResult<ShrLine> {
    let conditions = state.conditions();
    let slope = shr_slope(conditions.units(), shr)?;
    let adp_dry_bulb = line_saturation_intersection(&conditions, state.chart_point(), slope, state.dry_bulb())?;
    let adp = resolve_saturated(&conditions, adp_dry_bulb)?;
    debug!(shr, slope, adp = adp_dry_bulb, "shr line");
    Ok(ShrLine {
        shr,
        slope,
        points: straight_between(state, &adp, STRAIGHT_SEGMENTS),
        adp,
    })
}

/// Room and ventilation loads for a grand SHR analysis.
///
/// Loads are in BTU/hr (IP) or W (SI); airflow in cfm or m³/s.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GshrParams {
    pub room: StateSpec,
    pub outdoor: StateSpec,
    pub room_sensible_load: f64,
    pub room_total_load: f64,
    pub oa_fraction: f64,
    pub total_airflow: f64,
    #[serde(default)]
    pub bypass_factor: Option<f64>,
}

impl GshrParams {
    pub fn validate(&self) -> EngineResult<()> {
        finite("room_sensible_load", self.room_sensible_load)?;
        finite("room_total_load", self.room_total_load)?;
        if self.room_sensible_load > self.room_total_load {
            return Err(EngineError::invalid(
                "room_sensible_load",
                "room sensible load cannot exceed room total load",
            ));
        }
        unit_fraction("oa_fraction", self.oa_fraction)?;
        if !self.total_airflow.is_finite() || self.total_airflow < 0.0 {
            return Err(EngineError::invalid(
                "total_airflow",
                format!("{} must be non-negative", self.total_airflow),
            ));
        }
        if let Some(bf) = self.bypass_factor {
            open_fraction("bypass_factor", bf)?;
        }
        self.room.entries()?;
        self.outdoor.entries()?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GshrResult {
    pub room: AirState,
    pub outdoor: AirState,
    pub mixed: AirState,
    pub oa_sensible_load: f64,
    pub oa_total_load: f64,
    pub room_shr: f64,
    /// GSHR the grand line is drawn for, clamped to `[MIN_LINE_SHR, 1]`.
    pub gshr: f64,
    /// GSHR as computed from the loads.
    pub gshr_raw: f64,
    /// ESHR the effective line is drawn for, clamped like `gshr`.
    pub eshr: Option<f64>,
    pub eshr_raw: Option<f64>,
    pub room_line: ShrLine,
    pub grand_line: ShrLine,
    pub effective_line: Option<ShrLine>,
    pub warnings: Vec<String>,
}

/// Room SHR, grand SHR and (with a bypass factor) effective SHR, each with
/// its own line and ADP through the room state.
pub fn grand_shr(conditions: &Conditions, params: &GshrParams) -> EngineResult<GshrResult> {
    params.validate()?;
    let room = params.room.resolve(conditions)?;
    let outdoor = params.outdoor.resolve(conditions)?;
    let mut warnings = Warnings::new();

    let x = params.oa_fraction;
    let mixed = resolve_dry_bulb_hum_ratio(
        conditions,
        room.dry_bulb() + x * (outdoor.dry_bulb() - room.dry_bulb()),
        room.humidity_ratio() + x * (outdoor.humidity_ratio() - room.humidity_ratio()),
    )?;

    let (oa_sensible_load, oa_total_load) = ventilation_loads(&room, &outdoor, params.total_airflow * x);

    let room_shr = if params.room_total_load > 0.0 {
        params.room_sensible_load / params.room_total_load
    } else {
        1.0
    };
    let total_sensible = params.room_sensible_load + oa_sensible_load;
    let total_heat = params.room_total_load + oa_total_load;
    let gshr_raw = if total_heat > 0.0 {
        total_sensible / total_heat
    } else {
        warnings.push("Total heat load is non-positive; GSHR taken as 1");
        1.0
    };

    let room_line = shr_line(&room, clamped("Room SHR", room_shr, &mut warnings))?;
    let gshr = clamped("GSHR", gshr_raw, &mut warnings);
    let grand_line = shr_line(&room, gshr)?;

    let (eshr_raw, eshr, effective_line) = match params.bypass_factor {
        Some(bf) => {
            let raw = 1.0 - (1.0 - gshr_raw) / (1.0 - bf);
            let eshr = clamped("ESHR", raw, &mut warnings);
            (Some(raw), Some(eshr), Some(shr_line(&room, eshr)?))
        }
        None => (None, None, None),
    };
    debug!(room_shr, gshr_raw, ?eshr_raw, "grand shr");

    Ok(GshrResult {
        room,
        outdoor,
        mixed,
        oa_sensible_load,
        oa_total_load,
        room_shr,
        gshr,
        gshr_raw,
        eshr,
        eshr_raw,
        room_line,
        grand_line,
        effective_line,
        warnings: warnings.into_vec(),
    })
}

/// Outdoor-air sensible and total loads at the room density.
fn ventilation_loads(room: &AirState, outdoor: &AirState, oa_airflow: f64) -> (f64, f64) {
    let rho = room.density();
    let cp = room.conditions().psychrometrics().cp_moist_air();
    let dt = outdoor.dry_bulb() - room.dry_bulb();
    let dh = outdoor.enthalpy() - room.enthalpy();
    match room.units() {
        UnitSystem::Ip => (60.0 * rho * cp * oa_airflow * dt, 4.5 * oa_airflow * dh),
        UnitSystem::Si => {
            let mass_flow = rho * oa_airflow;
            (mass_flow * cp * dt * 1000.0, mass_flow * dh * 1000.0)
        }
    }
}

fn clamped(name: &str, ratio: f64, warnings: &mut Warnings) -> f64 {
    if (MIN_LINE_SHR..=1.0).contains(&ratio) {
        return ratio;
    }
    let line = ratio.clamp(MIN_LINE_SHR, 1.0);
    warnings.push(format!(
        "{name} {ratio:.3} is outside the normal range; the line is drawn for {line:.2}"
    ));
    line
}
