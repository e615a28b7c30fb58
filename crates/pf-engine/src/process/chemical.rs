//! Desiccant (chemical) dehumidification at constant enthalpy.

use pf_solver::find_root;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{EngineError, EngineResult};
use crate::path::{ENTHALPY_SEGMENTS, constant_enthalpy};
use crate::process::{ProcessKind, ProcessResult, ProcessSolver, Warnings};
use crate::resolver::resolve;
use crate::state::{AirState, Property};

/// Lower bracket for the RH-target humidity-ratio search.
const MIN_SEARCH_HUM_RATIO: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChemicalTarget {
    HumidityRatio(f64),
    RelativeHumidity(f64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChemicalDehumParams {
    pub target: ChemicalTarget,
}

impl ProcessSolver for ChemicalDehumParams {
    fn validate(&self) -> EngineResult<()> {
        match self.target {
            ChemicalTarget::HumidityRatio(w) if !w.is_finite() || w < 0.0 => Err(EngineError::invalid(
                "target_humidity_ratio",
                format!("{w} must be non-negative"),
            )),
            ChemicalTarget::RelativeHumidity(rh) if !(rh.is_finite() && rh > 0.0 && rh <= 1.0) => Err(
                EngineError::invalid("target_relative_humidity", format!("{rh} must be in (0, 1]")),
            ),
            _ => Ok(()),
        }
    }

    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult> {
        let h = start.enthalpy();
        let w_end = match self.target {
            ChemicalTarget::HumidityRatio(w) => w,
            ChemicalTarget::RelativeHumidity(rh) => hum_ratio_at_rh_on_enthalpy(start, rh)?,
        };

        let mut warnings = Warnings::new();
        if w_end > start.humidity_ratio() {
            warnings.push(format!(
                "Target humidity ratio {w_end:.6} is above the start {:.6}; this is humidification",
                start.humidity_ratio()
            ));
        }

        let conditions = start.conditions();
        let tdb = conditions.psychrometrics().dry_bulb_from_enthalpy(h, w_end)?;
        let end = resolve(&conditions, (Property::DryBulb, tdb), (Property::Enthalpy, h))?;

        let path = constant_enthalpy(start, &end, h, ENTHALPY_SEGMENTS)?;
        let (dt, dw) = (end.dry_bulb() - start.dry_bulb(), end.humidity_ratio() - start.humidity_ratio());
        Ok(ProcessResult::new(ProcessKind::ChemicalDehumidification, start.clone(), end, path)
            .with_meta("enthalpy", h)
            .with_meta("delta_t", dt)
            .with_meta("delta_w", dw)
            .with_warnings(warnings))
    }
}

/// Humidity ratio on the start's enthalpy line where RH equals `rh`.
fn hum_ratio_at_rh_on_enthalpy(start: &AirState, rh: f64) -> EngineResult<f64> {
    let psy = start.conditions().psychrometrics();
    let (h, p) = (start.enthalpy(), start.pressure());
    let objective = |w: f64| -> EngineResult<f64> {
        let tdb = psy.dry_bulb_from_enthalpy(h, w)?;
        Ok(psy.rel_hum_from_hum_ratio(tdb, w, p)? - rh)
    };

    let (lo, hi) = (MIN_SEARCH_HUM_RATIO, start.humidity_ratio());
    if hi <= lo || objective(lo)? * objective(hi)? > 0.0 {
        return Err(EngineError::resolution(format!(
            "RH {rh:.4} is not reachable by constant-enthalpy drying from RH {:.4}",
            start.relative_humidity()
        )));
    }
    let root = find_root(objective, lo, hi, psy.root_config())?;
    trace!(humidity_ratio = root.x, iterations = root.iterations, "target RH on enthalpy line");
    Ok(root.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::UnitSystem;

    use crate::conditions::Conditions;
    use crate::process::{ProcessParams, run};

    fn humid() -> AirState {
        resolve(
            &Conditions::sea_level(UnitSystem::Ip),
            (Property::DryBulb, 80.0),
            (Property::RelativeHumidity, 0.7),
        )
        .unwrap()
    }

    #[test]
    fn target_humidity_ratio_holds_enthalpy() {
        let s = humid();
        let r = run(
            &s,
            &ProcessParams::ChemicalDehumidification(ChemicalDehumParams {
                target: ChemicalTarget::HumidityRatio(0.006),
            }),
        )
        .unwrap();
        assert!((r.end.humidity_ratio() - 0.006).abs() < 1e-9);
        assert!((r.end.enthalpy() - s.enthalpy()).abs() < 1e-6);
        assert!(r.end.dry_bulb() > s.dry_bulb());
        assert_eq!(r.path.len(), ENTHALPY_SEGMENTS + 1);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn target_rh_is_reached() {
        let s = humid();
        let r = ChemicalDehumParams {
            target: ChemicalTarget::RelativeHumidity(0.2),
        }
        .solve(&s)
        .unwrap();
        assert!((r.end.relative_humidity() - 0.2).abs() < 1e-5);
        assert!(r.end.humidity_ratio() < s.humidity_ratio());
    }

    #[test]
    fn unreachable_rh_is_resolution_error() {
        let s = humid();
        let err = ChemicalDehumParams {
            target: ChemicalTarget::RelativeHumidity(0.9),
        }
        .solve(&s)
        .unwrap_err();
        assert!(matches!(err, EngineError::Resolution { .. }));
    }

    #[test]
    fn rising_humidity_ratio_warns() {
        let s = humid();
        let r = ChemicalDehumParams {
            target: ChemicalTarget::HumidityRatio(s.humidity_ratio() + 0.001),
        }
        .solve(&s)
        .unwrap();
        assert_eq!(r.warnings.len(), 1);
    }
}
