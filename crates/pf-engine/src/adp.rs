//! Apparatus dew point: where a process line meets the saturation curve.

use pf_solver::find_root;
use tracing::debug;

use crate::conditions::Conditions;
use crate::error::{EngineError, EngineResult};
use crate::path::ChartPoint;
use crate::resolver::resolve_saturated;
use crate::state::AirState;

/// Lines flatter than this are treated as purely sensible.
pub const MIN_SLOPE: f64 = 1e-9;

const MIN_DRY_BULB_SPAN: f64 = 1e-10;

/// ADP of the line through `entering` and `leaving`, searched between the
/// chart minimum and the leaving dry bulb.
///
/// A (near-)horizontal line is rejected before any solve: it describes a
/// sensible process with no apparatus dew point.
pub fn find_adp(conditions: &Conditions, entering: ChartPoint, leaving: ChartPoint) -> EngineResult<AirState> {
    let span = leaving.dry_bulb - entering.dry_bulb;
    if span.abs() < MIN_DRY_BULB_SPAN {
        return Err(EngineError::no_intersection(
            "entering and leaving dry bulbs are identical, the process line is undefined",
        ));
    }
    let slope = (leaving.humidity_ratio - entering.humidity_ratio) / span;
    if slope.abs() < MIN_SLOPE {
        return Err(EngineError::no_intersection(format!(
            "process line slope {slope:e} is effectively horizontal (purely sensible)"
        )));
    }
    let tdb = line_saturation_intersection(conditions, entering, slope, leaving.dry_bulb)?;
    resolve_saturated(conditions, tdb)
}

/// Segments scanned downward from the ceiling when bracketing the crossing.
const SCAN_SEGMENTS: usize = 64;

/// Dry bulb where `W = anchor.W + slope·(Tdb − anchor.Tdb)` crosses saturation,
/// searched on `[chart minimum, upper]`.
///
/// The window is scanned downward from `upper` and the first crossing is
/// taken, so a steep line that dips back under the curve near the chart
/// minimum still yields the crossing nearest the leaving state. A zero slope
/// is accepted here and yields the dew point of `anchor`.
pub fn line_saturation_intersection(
    conditions: &Conditions,
    anchor: ChartPoint,
    slope: f64,
    upper: f64,
) -> EngineResult<f64> {
    let psy = conditions.psychrometrics();
    let p = conditions.pressure();
    let lower = conditions.units().chart_range().dry_bulb_min;
    if upper <= lower {
        return Err(EngineError::no_intersection(format!(
            "search ceiling {upper} is at or below the chart minimum {lower}"
        )));
    }

    let objective = |tdb: f64| -> EngineResult<f64> {
        let on_line = anchor.humidity_ratio + slope * (tdb - anchor.dry_bulb);
        Ok(psy.sat_hum_ratio(tdb, p)? - on_line)
    };

    let step = (upper - lower) / SCAN_SEGMENTS as f64;
    let (mut hi, mut f_hi) = (upper, objective(upper)?);
    let mut bracket = None;
    for i in 1..=SCAN_SEGMENTS {
        let lo = if i == SCAN_SEGMENTS { lower } else { upper - i as f64 * step };
        let f_lo = objective(lo)?;
        if f_lo * f_hi <= 0.0 {
            bracket = Some((lo, hi));
            break;
        }
        (hi, f_hi) = (lo, f_lo);
    }
    let Some((lo, hi)) = bracket else {
        return Err(EngineError::no_intersection(format!(
            "line through ({}, {}) with slope {slope:e} stays on one side of saturation between {lower} and {upper}",
            anchor.dry_bulb, anchor.humidity_ratio
        )));
    };

    let root = find_root(objective, lo, hi, psy.root_config())?;
    debug!(adp = root.x, iterations = root.iterations, slope, "saturation intersection");
    Ok(root.x)
}
