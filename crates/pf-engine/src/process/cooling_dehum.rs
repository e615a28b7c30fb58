//! Cooling and dehumidification along the line from the entering state to
//! its apparatus dew point.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adp::find_adp;
use crate::effectiveness::{Approach, approach};
use crate::error::{EngineError, EngineResult, finite, open_fraction};
use crate::path::{STRAIGHT_SEGMENTS, straight_between};
use crate::process::{ProcessKind, ProcessResult, ProcessSolver, Warnings};
use crate::resolver::resolve_saturated;
use crate::state::{AirState, StateSpec};

const AXIS_AGREEMENT: f64 = 1e-4;
const MIN_W_SPAN: f64 = 1e-6;

/// Forward: ADP and bypass factor give the leaving state.
/// Reverse: the leaving state gives ADP and bypass factor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolingMode {
    Forward { adp_dry_bulb: f64, bypass_factor: f64 },
    Reverse { leaving: StateSpec },
}

impl CoolingMode {
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            CoolingMode::Forward {
                adp_dry_bulb,
                bypass_factor,
            } => {
                finite("adp_dry_bulb", *adp_dry_bulb)?;
                open_fraction("bypass_factor", *bypass_factor)?;
            }
            CoolingMode::Reverse { leaving } => {
                for (p, v) in leaving.entries()? {
                    finite(p.field_name(), v)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoolingDehumParams {
    pub mode: CoolingMode,
}

/// Coil line solution shared by the process solver and coil analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct CoilSolution {
    pub adp: AirState,
    pub leaving: AirState,
    pub bypass_factor: f64,
    pub warnings: Warnings,
}

/// Per-unit-mass coil loads (BTU/lb or kJ/kg), positive for cooling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UnitLoads {
    pub sensible: f64,
    pub latent: f64,
    pub total: f64,
    pub shr: f64,
}

/// Sensible from the dry-bulb drop, total from the enthalpy drop, latent as
/// the remainder. SHR is 1 for a vanishing total.
pub fn unit_loads(entering: &AirState, leaving: &AirState) -> UnitLoads {
    let cp = entering.conditions().psychrometrics().cp_moist_air();
    let sensible = cp * (entering.dry_bulb() - leaving.dry_bulb());
    let total = entering.enthalpy() - leaving.enthalpy();
    let shr = if total.abs() > 1e-10 { sensible / total } else { 1.0 };
    UnitLoads {
        sensible,
        latent: total - sensible,
        total,
        shr,
    }
}

/// Leaving state `ADP + BF·(entering − ADP)` on both chart axes.
pub fn solve_forward(entering: &AirState, adp_dry_bulb: f64, bypass_factor: f64) -> EngineResult<CoilSolution> {
    open_fraction("bypass_factor", bypass_factor)?;
    let adp = resolve_saturated(&entering.conditions(), adp_dry_bulb)?;

    let mut warnings = Warnings::new();
    if adp_dry_bulb >= entering.dew_point() {
        warnings.push(format!(
            "ADP {adp_dry_bulb:.1} is at or above the entering dew point {:.1}; no dehumidification would occur",
            entering.dew_point()
        ));
    }

    let leaving = approach(&adp, Approach::Straight(entering.chart_point()), bypass_factor)?;
    Ok(CoilSolution {
        adp,
        leaving,
        bypass_factor,
        warnings,
    })
}

/// Back-solves ADP and bypass factor from a known leaving state.
///
/// The bypass factor is checked on both axes and must lie in (0, 1).
pub fn solve_reverse(entering: &AirState, leaving: &AirState) -> EngineResult<CoilSolution> {
    if leaving.dry_bulb() >= entering.dry_bulb() {
        return Err(EngineError::invalid(
            "leaving",
            format!(
                "leaving dry bulb {:.2} must be below the entering dry bulb {:.2}",
                leaving.dry_bulb(),
                entering.dry_bulb()
            ),
        ));
    }

    let mut warnings = Warnings::new();
    if leaving.humidity_ratio() >= entering.humidity_ratio() {
        warnings.push(format!(
            "Leaving humidity ratio {:.6} is not below the entering {:.6}; this looks like sensible cooling only",
            leaving.humidity_ratio(),
            entering.humidity_ratio()
        ));
    }

    let adp = find_adp(&entering.conditions(), entering.chart_point(), leaving.chart_point())?;
    let span = entering.dry_bulb() - adp.dry_bulb();
    if span.abs() < 1e-10 {
        return Err(EngineError::invalid_result(
            "entering dry bulb equals the ADP, the bypass factor is undefined",
        ));
    }
    let bypass_factor = (leaving.dry_bulb() - adp.dry_bulb()) / span;

    let w_span = entering.humidity_ratio() - adp.humidity_ratio();
    if w_span.abs() > MIN_W_SPAN {
        let on_w = (leaving.humidity_ratio() - adp.humidity_ratio()) / w_span;
        if (on_w - bypass_factor).abs() > AXIS_AGREEMENT {
            return Err(EngineError::invalid_result(format!(
                "bypass factor {bypass_factor:.5} from dry bulb disagrees with {on_w:.5} from humidity ratio"
            )));
        }
    }
    if !(bypass_factor > 0.0 && bypass_factor < 1.0) {
        return Err(EngineError::invalid_result(format!(
            "bypass factor {bypass_factor:.4} is outside (0, 1); the leaving state cannot come from a single coil pass"
        )));
    }
    debug!(adp = adp.dry_bulb(), bypass_factor, "coil reverse solved");

    Ok(CoilSolution {
        adp,
        leaving: leaving.clone(),
        bypass_factor,
        warnings,
    })
}

/// Dispatches on `mode`, resolving a reverse leaving spec at the entering conditions.
pub fn solve(entering: &AirState, mode: &CoolingMode) -> EngineResult<CoilSolution> {
    match mode {
        CoolingMode::Forward {
            adp_dry_bulb,
            bypass_factor,
        } => solve_forward(entering, *adp_dry_bulb, *bypass_factor),
        CoolingMode::Reverse { leaving } => {
            let leaving = leaving.resolve(&entering.conditions())?;
            solve_reverse(entering, &leaving)
        }
    }
}

impl ProcessSolver for CoolingDehumParams {
    fn validate(&self) -> EngineResult<()> {
        self.mode.validate()
    }

    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult> {
        let solution = solve(start, &self.mode)?;
        Ok(into_result(start, solution))
    }
}

pub(crate) fn into_result(start: &AirState, solution: CoilSolution) -> ProcessResult {
    let CoilSolution {
        adp,
        leaving,
        bypass_factor,
        warnings,
    } = solution;
    let loads = unit_loads(start, &leaving);
    let path = straight_between(start, &leaving, STRAIGHT_SEGMENTS);
    ProcessResult::new(ProcessKind::CoolingDehumidification, start.clone(), leaving, path)
        .with_meta("adp_dry_bulb", adp.dry_bulb())
        .with_meta("adp_humidity_ratio", adp.humidity_ratio())
        .with_meta("bypass_factor", bypass_factor)
        .with_meta("contact_factor", 1.0 - bypass_factor)
        .with_meta("sensible", loads.sensible)
        .with_meta("latent", loads.latent)
        .with_meta("total", loads.total)
        .with_meta("shr", loads.shr)
        .with_meta("adp", adp)
        .with_warnings(warnings)
}
