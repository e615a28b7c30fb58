//! Adiabatic mixing of any number of airstreams.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::path::{STRAIGHT_SEGMENTS, straight_between};
use crate::process::{ProcessKind, ProcessResult, ProcessSolver, Warnings};
use crate::resolver::resolve_dry_bulb_hum_ratio;
use crate::state::{AirState, StateSpec};

/// Stream flow, either volumetric (cfm or m³/s) or dry-air mass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamFlow {
    Volume(f64),
    Mass(f64),
}

impl StreamFlow {
    fn raw(self) -> f64 {
        match self {
            StreamFlow::Volume(v) | StreamFlow::Mass(v) => v,
        }
    }

    fn check(self, field: &str) -> EngineResult<()> {
        let v = self.raw();
        if !v.is_finite() || v < 0.0 {
            return Err(EngineError::invalid(field, format!("flow {v} must be non-negative")));
        }
        Ok(())
    }

    /// Dry-air mass flow; volume is converted with the stream's specific volume.
    pub fn mass(self, state: &AirState) -> f64 {
        match self {
            StreamFlow::Volume(v) => v / state.specific_volume(),
            StreamFlow::Mass(m) => m,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MixingStream {
    pub state: StateSpec,
    pub flow: StreamFlow,
}

/// The start state is the first stream; `streams` are mixed into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MixingParams {
    pub start_flow: StreamFlow,
    pub streams: Vec<MixingStream>,
}

/// Result of [`mix`].
#[derive(Clone, Debug, PartialEq)]
pub struct Mixture {
    pub state: AirState,
    /// Dry-air mass fraction of each stream, in input order.
    pub mass_fractions: Vec<f64>,
    pub enthalpy: f64,
    pub warnings: Warnings,
}

/// Mass-weighted mix of `streams`.
///
/// Humidity ratio and enthalpy are conserved; the dry bulb follows from the
/// enthalpy relation at the mixed humidity ratio. Zero-flow streams pass
/// through without effect.
pub fn mix(streams: &[(&AirState, StreamFlow)]) -> EngineResult<Mixture> {
    let Some((first, _)) = streams.first() else {
        return Err(EngineError::invalid("streams", "at least one stream is required"));
    };
    let conditions = first.conditions();
    let mut masses = Vec::with_capacity(streams.len());
    for (i, (state, flow)) in streams.iter().enumerate() {
        flow.check(&format!("streams[{i}].flow"))?;
        if state.conditions() != conditions {
            return Err(EngineError::invalid(
                format!("streams[{i}]"),
                "all streams must share the unit system and pressure",
            ));
        }
        masses.push(flow.mass(state));
    }
    let total: f64 = masses.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return Err(EngineError::invalid("streams", "total flow must be positive"));
    }

    let w_mix = streams.iter().zip(&masses).map(|((s, _), m)| m * s.humidity_ratio()).sum::<f64>() / total;
    let h_mix = streams.iter().zip(&masses).map(|((s, _), m)| m * s.enthalpy()).sum::<f64>() / total;

    let psy = conditions.psychrometrics();
    let tdb = psy.dry_bulb_from_enthalpy(h_mix, w_mix)?;
    let state = resolve_dry_bulb_hum_ratio(&conditions, tdb, w_mix)?;
    debug!(streams = streams.len(), dry_bulb = tdb, humidity_ratio = w_mix, "streams mixed");

    let mut warnings = Warnings::new();
    let w_sat = psy.sat_hum_ratio(tdb, conditions.pressure())?;
    if w_mix > w_sat {
        warnings.push(format!(
            "Mixed humidity ratio {w_mix:.6} exceeds saturation {w_sat:.6} at {tdb:.1}; condensation (fog) would form"
        ));
    }

    Ok(Mixture {
        state,
        mass_fractions: masses.iter().map(|m| m / total).collect(),
        enthalpy: h_mix,
        warnings,
    })
}

impl ProcessSolver for MixingParams {
    fn validate(&self) -> EngineResult<()> {
        if self.streams.is_empty() {
            return Err(EngineError::invalid("streams", "at least one stream must be mixed into the start"));
        }
        self.start_flow.check("start_flow")?;
        let mut any_flow = self.start_flow.raw() > 0.0;
        for (i, s) in self.streams.iter().enumerate() {
            s.flow.check(&format!("streams[{i}].flow"))?;
            s.state.entries()?;
            any_flow |= s.flow.raw() > 0.0;
        }
        if !any_flow {
            return Err(EngineError::invalid("streams", "all flows are zero"));
        }
        Ok(())
    }

    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult> {
        let conditions = start.conditions();
        let others = self
            .streams
            .iter()
            .map(|s| s.state.resolve(&conditions))
            .collect::<EngineResult<Vec<_>>>()?;

        let mut inputs = vec![(start, self.start_flow)];
        inputs.extend(others.iter().zip(&self.streams).map(|(state, s)| (state, s.flow)));
        let mixture = mix(&inputs)?;

        let path = straight_between(start, &mixture.state, STRAIGHT_SEGMENTS);
        let mut result = ProcessResult::new(ProcessKind::AdiabaticMixing, start.clone(), mixture.state.clone(), path)
            .with_meta("mixed_enthalpy", mixture.enthalpy)
            .with_meta("mixed_humidity_ratio", mixture.state.humidity_ratio());
        for (i, fraction) in mixture.mass_fractions.iter().enumerate() {
            result = result.with_meta(&format!("mass_fraction_{}", i + 1), *fraction);
        }
        for (i, state) in others.into_iter().enumerate() {
            result = result.with_meta(&format!("stream_{}", i + 2), state);
        }
        Ok(result.with_warnings(mixture.warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::UnitSystem;

    use crate::conditions::Conditions;
    use crate::process::{ProcessParams, run};
    use crate::resolver::resolve;
    use crate::state::Property;

    fn ip_state(tdb: f64, rh: f64) -> AirState {
        resolve(
            &Conditions::sea_level(UnitSystem::Ip),
            (Property::DryBulb, tdb),
            (Property::RelativeHumidity, rh),
        )
        .unwrap()
    }

    #[test]
    fn equal_mass_midpoint() {
        let a = ip_state(75.0, 0.5);
        let b = ip_state(95.0, 0.4);
        let m = mix(&[(&a, StreamFlow::Mass(1.0)), (&b, StreamFlow::Mass(1.0))]).unwrap();
        assert_eq!(m.state.humidity_ratio(), (a.humidity_ratio() + b.humidity_ratio()) / 2.0);
        assert!((m.state.dry_bulb() - 85.0).abs() < 0.1, "tdb = {}", m.state.dry_bulb());
        assert!((m.state.enthalpy() - m.enthalpy).abs() < 1e-9);
        assert_eq!(m.mass_fractions, vec![0.5, 0.5]);
        assert!(m.warnings.is_empty());
    }

    #[test]
    fn zero_flow_stream_passes_through() {
        let a = ip_state(75.0, 0.5);
        let b = ip_state(95.0, 0.4);
        let m = mix(&[(&a, StreamFlow::Volume(800.0)), (&b, StreamFlow::Volume(0.0))]).unwrap();
        assert!((m.state.humidity_ratio() - a.humidity_ratio()).abs() < 1e-15);
        assert!((m.state.dry_bulb() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn volume_flow_is_weighted_by_density() {
        let cold = ip_state(20.0, 0.5);
        let warm = ip_state(100.0, 0.2);
        let m = mix(&[(&cold, StreamFlow::Volume(1000.0)), (&warm, StreamFlow::Volume(1000.0))]).unwrap();
        // Denser cold air carries more mass.
        assert!(m.mass_fractions[0] > 0.5);
        assert!(m.state.dry_bulb() < 60.0);
    }

    #[test]
    fn cold_and_humid_mix_warns_of_fog() {
        let cold = ip_state(20.0, 0.9);
        let humid = ip_state(100.0, 0.95);
        let m = mix(&[(&cold, StreamFlow::Mass(1.0)), (&humid, StreamFlow::Mass(1.0))]).unwrap();
        assert_eq!(m.warnings.into_vec().len(), 1);
    }

    #[test]
    fn invalid_flows_are_rejected() {
        let a = ip_state(75.0, 0.5);
        assert!(mix(&[(&a, StreamFlow::Mass(0.0))]).is_err());
        assert!(mix(&[(&a, StreamFlow::Mass(-1.0))]).is_err());
        assert!(mix(&[]).is_err());

        let params = ProcessParams::AdiabaticMixing(MixingParams {
            start_flow: StreamFlow::Volume(0.0),
            streams: vec![MixingStream {
                state: StateSpec::new((Property::DryBulb, 95.0), (Property::RelativeHumidity, 0.4)),
                flow: StreamFlow::Volume(0.0),
            }],
        });
        assert!(params.validate().is_err());
    }

    #[test]
    fn process_reports_streams_and_fractions() {
        let a = ip_state(75.0, 0.5);
        let params = ProcessParams::AdiabaticMixing(MixingParams {
            start_flow: StreamFlow::Mass(3.0),
            streams: vec![MixingStream {
                state: StateSpec::new((Property::DryBulb, 95.0), (Property::RelativeHumidity, 0.4)),
                flow: StreamFlow::Mass(1.0),
            }],
        });
        let r = run(&a, &params).unwrap();
        assert_eq!(r.kind, ProcessKind::AdiabaticMixing);
        assert_eq!(r.number("mass_fraction_1"), Some(0.75));
        assert!(r.state("stream_2").is_some());
        assert_eq!(r.path.first().unwrap().chart_point(), a.chart_point());
        assert_eq!(r.path.last().unwrap().chart_point(), r.end.chart_point());
    }
}
