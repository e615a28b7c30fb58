//! Direct, indirect and two-stage evaporative cooling.

use serde::{Deserialize, Serialize};

use crate::effectiveness::{Approach, approach, check_effectiveness};
use crate::error::{EngineResult, unit_fraction};
use crate::path::{STRAIGHT_SEGMENTS, WET_BULB_SEGMENTS, constant_wet_bulb, straight_between};
use crate::process::{ProcessKind, ProcessResult, ProcessSolver, Warnings};
use crate::state::{AirState, StateSpec};

/// Segments of the indirect stage in a two-stage path.
const TWO_STAGE_INDIRECT_SEGMENTS: usize = 6;
/// Segments of the direct stage in a two-stage path.
const TWO_STAGE_DIRECT_SEGMENTS: usize = 14;

/// Wetted media in the airstream: constant wet bulb.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectEvaporativeParams {
    pub effectiveness: f64,
}

impl ProcessSolver for DirectEvaporativeParams {
    fn validate(&self) -> EngineResult<()> {
        check_effectiveness(self.effectiveness)?;
        Ok(())
    }

    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult> {
        let wet_bulb = start.wet_bulb();
        let end = approach(start, Approach::WetBulb(wet_bulb), self.effectiveness)?;
        let path = constant_wet_bulb(start, &end, wet_bulb, WET_BULB_SEGMENTS)?;
        let (dt, dw) = (end.dry_bulb() - start.dry_bulb(), end.humidity_ratio() - start.humidity_ratio());
        Ok(ProcessResult::new(ProcessKind::DirectEvaporative, start.clone(), end, path)
            .with_meta("effectiveness", self.effectiveness)
            .with_meta("wet_bulb", wet_bulb)
            .with_meta("delta_t", dt)
            .with_meta("delta_w", dw))
    }
}

/// Heat exchanger cooled by a wetted secondary stream: constant humidity
/// ratio, limited by the secondary wet bulb.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndirectEvaporativeParams {
    pub effectiveness: f64,
    /// Secondary air; the primary entering air when absent.
    #[serde(default)]
    pub secondary: Option<StateSpec>,
}

fn secondary_wet_bulb(start: &AirState, secondary: Option<&StateSpec>) -> EngineResult<f64> {
    match secondary {
        Some(spec) => Ok(spec.resolve(&start.conditions())?.wet_bulb()),
        None => Ok(start.wet_bulb()),
    }
}

fn check_secondary(secondary: Option<&StateSpec>) -> EngineResult<()> {
    if let Some(spec) = secondary {
        spec.entries()?;
    }
    Ok(())
}

fn indirect_warnings(start: &AirState, end: &AirState, warnings: &mut Warnings) {
    if end.dry_bulb() > start.dry_bulb() + 0.01 {
        warnings.push(format!(
            "End dry bulb {:.1} is above the start {:.1}; the secondary wet bulb may exceed the primary dry bulb",
            end.dry_bulb(),
            start.dry_bulb()
        ));
    }
    if end.dry_bulb() < start.dew_point() {
        warnings.push(format!(
            "End dry bulb {:.1} is below the dew point {:.1}; condensation would form on the heat exchanger",
            end.dry_bulb(),
            start.dew_point()
        ));
    }
}

impl ProcessSolver for IndirectEvaporativeParams {
    fn validate(&self) -> EngineResult<()> {
        check_effectiveness(self.effectiveness)?;
        check_secondary(self.secondary.as_ref())
    }

    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult> {
        let limit = secondary_wet_bulb(start, self.secondary.as_ref())?;
        let end = approach(start, Approach::Sensible(limit), self.effectiveness)?;

        let mut warnings = Warnings::new();
        indirect_warnings(start, &end, &mut warnings);

        let path = straight_between(start, &end, STRAIGHT_SEGMENTS);
        let dt = end.dry_bulb() - start.dry_bulb();
        Ok(ProcessResult::new(ProcessKind::IndirectEvaporative, start.clone(), end, path)
            .with_meta("effectiveness", self.effectiveness)
            .with_meta("secondary_wet_bulb", limit)
            .with_meta("delta_t", dt)
            .with_warnings(warnings))
    }
}

/// Indirect stage followed by a direct stage on the intermediate wet bulb.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TwoStageEvaporativeParams {
    pub iec_effectiveness: f64,
    pub dec_effectiveness: f64,
    #[serde(default)]
    pub secondary: Option<StateSpec>,
}

impl ProcessSolver for TwoStageEvaporativeParams {
    fn validate(&self) -> EngineResult<()> {
        unit_fraction("iec_effectiveness", self.iec_effectiveness)?;
        unit_fraction("dec_effectiveness", self.dec_effectiveness)?;
        check_secondary(self.secondary.as_ref())
    }

    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult> {
        let limit = secondary_wet_bulb(start, self.secondary.as_ref())?;
        let mid = approach(start, Approach::Sensible(limit), self.iec_effectiveness)?;
        let mid_wet_bulb = mid.wet_bulb();
        let end = approach(&mid, Approach::WetBulb(mid_wet_bulb), self.dec_effectiveness)?;

        let mut warnings = Warnings::new();
        indirect_warnings(start, &mid, &mut warnings);

        let mut path = straight_between(start, &mid, TWO_STAGE_INDIRECT_SEGMENTS);
        let direct = constant_wet_bulb(&mid, &end, mid_wet_bulb, TWO_STAGE_DIRECT_SEGMENTS)?;
        path.extend(direct.into_iter().skip(1));

        let (dt, dw) = (end.dry_bulb() - start.dry_bulb(), end.humidity_ratio() - start.humidity_ratio());
        Ok(ProcessResult::new(ProcessKind::IndirectDirectEvaporative, start.clone(), end, path)
            .with_meta("iec_effectiveness", self.iec_effectiveness)
            .with_meta("dec_effectiveness", self.dec_effectiveness)
            .with_meta("secondary_wet_bulb", limit)
            .with_meta("intermediate_wet_bulb", mid_wet_bulb)
            .with_meta("intermediate", mid)
            .with_meta("delta_t", dt)
            .with_meta("delta_w", dw)
            .with_warnings(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::UnitSystem;

    use crate::conditions::Conditions;
    use crate::error::EngineError;
    use crate::process::{ProcessParams, run};
    use crate::resolver::resolve;
    use crate::state::Property;

    fn hot_dry() -> AirState {
        resolve(
            &Conditions::sea_level(UnitSystem::Ip),
            (Property::DryBulb, 100.0),
            (Property::RelativeHumidity, 0.15),
        )
        .unwrap()
    }

    #[test]
    fn direct_end_dry_bulb_follows_effectiveness() {
        let s = hot_dry();
        let r = run(
            &s,
            &ProcessParams::DirectEvaporative(DirectEvaporativeParams { effectiveness: 0.85 }),
        )
        .unwrap();
        let expected = s.dry_bulb() - 0.85 * (s.dry_bulb() - s.wet_bulb());
        assert!((r.end.dry_bulb() - expected).abs() < 1e-9);
        assert!(r.end.humidity_ratio() > s.humidity_ratio());
        assert!((r.end.enthalpy() - s.enthalpy()).abs() < 0.5);
    }

    #[test]
    fn indirect_holds_humidity_ratio() {
        let s = hot_dry();
        let r = IndirectEvaporativeParams {
            effectiveness: 0.6,
            secondary: None,
        }
        .solve(&s)
        .unwrap();
        assert_eq!(r.end.humidity_ratio(), s.humidity_ratio());
        assert_eq!(r.number("secondary_wet_bulb"), Some(s.wet_bulb()));
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn indirect_with_warm_secondary_warns() {
        let s = resolve(
            &Conditions::sea_level(UnitSystem::Ip),
            (Property::DryBulb, 60.0),
            (Property::RelativeHumidity, 0.5),
        )
        .unwrap();
        let r = IndirectEvaporativeParams {
            effectiveness: 0.7,
            secondary: Some(StateSpec::new((Property::DryBulb, 105.0), (Property::RelativeHumidity, 0.6))),
        }
        .solve(&s)
        .unwrap();
        assert!(r.end.dry_bulb() > s.dry_bulb());
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn two_stage_path_concatenates_segments() {
        let s = hot_dry();
        let r = TwoStageEvaporativeParams {
            iec_effectiveness: 0.6,
            dec_effectiveness: 0.9,
            secondary: None,
        }
        .solve(&s)
        .unwrap();
        let mid = r.state("intermediate").unwrap();
        assert_eq!(mid.humidity_ratio(), s.humidity_ratio());
        assert_eq!(r.path.len(), TWO_STAGE_INDIRECT_SEGMENTS + TWO_STAGE_DIRECT_SEGMENTS + 1);
        assert_eq!(r.path[TWO_STAGE_INDIRECT_SEGMENTS].chart_point(), mid.chart_point());
        assert_eq!(r.path.last().unwrap().chart_point(), r.end.chart_point());
        // Beats a single direct stage at the same effectiveness.
        let direct = DirectEvaporativeParams { effectiveness: 0.9 }.solve(&s).unwrap();
        assert!(r.end.dry_bulb() < direct.end.dry_bulb());
    }

    #[test]
    fn effectiveness_is_validated() {
        let p = ProcessParams::IndirectDirectEvaporative(TwoStageEvaporativeParams {
            iec_effectiveness: 0.6,
            dec_effectiveness: 1.2,
            secondary: None,
        });
        let err = p.validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "dec_effectiveness"));
    }
}
