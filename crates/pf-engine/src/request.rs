//! Request/response boundary: one serializable request in, one flat,
//! serializable response out.

use pf_core::UnitSystem;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ahu::{AhuParams, AhuResult, analyze_ahu};
use crate::airflow::{AirflowInput, AirflowResult, solve_load_equation};
use crate::coil::{CoilParams, CoilResult, analyze_coil};
use crate::condensation::{CondensationCheck, CondensationParams, check_condensation};
use crate::conditions::Conditions;
use crate::error::{EngineError, EngineResult};
use crate::process::{ProcessParams, ProcessResult, run};
use crate::shr::{GshrParams, GshrResult, ShrLine, grand_shr, shr_line};
use crate::state::{AirState, StateSpec};

/// Unit system plus either a pressure or an altitude; sea level when neither
/// is given.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionsSpec {
    pub units: UnitSystem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl ConditionsSpec {
    pub fn sea_level(units: UnitSystem) -> Self {
        Self {
            units,
            pressure: None,
            altitude: None,
        }
    }

    pub fn resolve(&self) -> EngineResult<Conditions> {
        match (self.pressure, self.altitude) {
            (Some(_), Some(_)) => Err(EngineError::invalid(
                "conditions",
                "give either pressure or altitude, not both",
            )),
            (Some(p), None) => Conditions::new(self.units, p),
            (None, Some(z)) => Conditions::from_altitude(self.units, z),
            (None, None) => Ok(Conditions::sea_level(self.units)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    ResolveState { state: StateSpec },
    Process { start: StateSpec, process: ProcessParams },
    Coil { entering: StateSpec, coil: CoilParams },
    ShrLine { state: StateSpec, shr: f64 },
    GrandShr(GshrParams),
    Airflow(AirflowInput),
    Condensation(CondensationParams),
    Ahu(AhuParams),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ResolveState { .. } => "resolve_state",
            Operation::Process { .. } => "process",
            Operation::Coil { .. } => "coil",
            Operation::ShrLine { .. } => "shr_line",
            Operation::GrandShr(_) => "grand_shr",
            Operation::Airflow(_) => "airflow",
            Operation::Condensation(_) => "condensation",
            Operation::Ahu(_) => "ahu",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub conditions: ConditionsSpec,
    pub operation: Operation,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    State(AirState),
    Process(ProcessResult),
    Coil(Box<CoilResult>),
    ShrLine(ShrLine),
    GrandShr(Box<GshrResult>),
    Airflow(AirflowResult),
    Condensation(CondensationCheck),
    Ahu(Box<AhuResult>),
}

/// Executes one request. Stateless: the result depends only on `request`.
pub fn execute(request: &Request) -> EngineResult<Response> {
    let conditions = request.conditions.resolve()?;
    debug!(
        operation = request.operation.name(),
        units = %conditions.units(),
        pressure = conditions.pressure(),
        "executing request"
    );

    Ok(match &request.operation {
        Operation::ResolveState { state } => Response::State(state.resolve(&conditions)?),
        Operation::Process { start, process } => {
            // Parameters first, so a malformed request never resolves a state.
            process.validate()?;
            let start = start.resolve(&conditions)?;
            Response::Process(run(&start, process)?)
        }
        Operation::Coil { entering, coil } => {
            coil.validate()?;
            let entering = entering.resolve(&conditions)?;
            Response::Coil(Box::new(analyze_coil(&entering, coil)?))
        }
        Operation::ShrLine { state, shr } => {
            let state = state.resolve(&conditions)?;
            Response::ShrLine(shr_line(&state, *shr)?)
        }
        Operation::GrandShr(params) => Response::GrandShr(Box::new(grand_shr(&conditions, params)?)),
        Operation::Airflow(input) => Response::Airflow(solve_load_equation(&conditions, input)?),
        Operation::Condensation(params) => {
            let state = params.state.resolve(&conditions)?;
            Response::Condensation(check_condensation(&state, params.surface_temperature)?)
        }
        Operation::Ahu(params) => Response::Ahu(Box::new(analyze_ahu(&conditions, params)?)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessKind;

    fn from_yaml(doc: &str) -> Request {
        serde_yaml::from_str(doc).unwrap()
    }

    #[test]
    fn resolve_state_request() {
        let req = from_yaml(
            "conditions: { units: IP }\n\
             operation: { type: resolve_state, state: { dry_bulb: 75.0, relative_humidity: 0.5 } }\n",
        );
        let Response::State(state) = execute(&req).unwrap() else {
            panic!("expected a state");
        };
        assert!((state.relative_humidity() - 0.5).abs() < 1e-12);
        assert_eq!(state.pressure(), 14.696);
    }

    #[test]
    fn process_request_from_yaml() {
        let req = from_yaml(
            r#"
conditions:
  units: IP
operation:
  type: process
  start: { dry_bulb: 55.0, relative_humidity: 0.9 }
  process:
    kind: sensible
    mode: { target_dry_bulb: 75.0 }
"#,
        );
        let Response::Process(result) = execute(&req).unwrap() else {
            panic!("expected a process result");
        };
        assert_eq!(result.kind, ProcessKind::SensibleHeating);
        assert_eq!(result.end.humidity_ratio(), result.start.humidity_ratio());
    }

    #[test]
    fn altitude_and_pressure_are_exclusive() {
        let spec = ConditionsSpec {
            units: UnitSystem::Si,
            pressure: Some(90_000.0),
            altitude: Some(1000.0),
        };
        assert!(spec.resolve().is_err());

        let spec = ConditionsSpec {
            altitude: None,
            ..spec
        };
        assert_eq!(spec.resolve().unwrap().pressure(), 90_000.0);
        assert_eq!(
            ConditionsSpec::sea_level(UnitSystem::Si).resolve().unwrap().pressure(),
            101_325.0
        );
    }

    #[test]
    fn invalid_parameters_fail_before_resolution() {
        // The start state is unresolvable, but the bad bypass factor is reported.
        let req = from_yaml(
            r#"
conditions: { units: IP }
operation:
  type: process
  start: { wet_bulb: 60.0, dew_point: 50.0 }
  process:
    kind: cooling_dehumidification
    mode: { forward: { adp_dry_bulb: 45.0, bypass_factor: 1.5 } }
"#,
        );
        let err = execute(&req).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "bypass_factor"));
    }

    #[test]
    fn response_serializes_flat() {
        let req = from_yaml(
            r#"
conditions: { units: SI }
operation:
  type: condensation
  state: { dry_bulb: 22.0, relative_humidity: 0.6 }
  surface_temperature: 10.0
"#,
        );
        let response = execute(&req).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "condensation");
        assert_eq!(json["is_condensing"], true);
    }
}
