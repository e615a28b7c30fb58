//! Process solvers: a resolved start state plus parameters in, one
//! [`ProcessResult`] out.
//!
//! Each parameter type implements [`ProcessSolver`]. Parameters are validated
//! in full before any state is resolved, so a malformed request never costs a
//! root solve.

pub mod chemical;
pub mod cooling_dehum;
pub mod evaporative;
pub mod humidification;
pub mod mixing;
pub mod sensible;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineResult;
use crate::path::PathPoint;
use crate::state::AirState;

pub use chemical::{ChemicalDehumParams, ChemicalTarget};
pub use cooling_dehum::{CoolingDehumParams, CoolingMode};
pub use evaporative::{DirectEvaporativeParams, IndirectEvaporativeParams, TwoStageEvaporativeParams};
pub use humidification::{
    AdiabaticHumidificationParams, AdiabaticMode, HeatedWaterParams, SteamParams, SteamTarget,
};
pub use mixing::{MixingParams, MixingStream, Mixture, StreamFlow, mix};
pub use sensible::{SensibleMode, SensibleParams};

/// Process type tag carried on every result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    SensibleHeating,
    SensibleCooling,
    SensibleReheat,
    CoolingDehumidification,
    AdiabaticMixing,
    SteamHumidification,
    AdiabaticHumidification,
    HeatedWaterHumidification,
    DirectEvaporative,
    IndirectEvaporative,
    IndirectDirectEvaporative,
    ChemicalDehumidification,
}

/// One metadata entry: a number, a nested state, or a label.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(f64),
    State(Box<AirState>),
    Text(String),
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        MetaValue::Number(v)
    }
}

impl From<AirState> for MetaValue {
    fn from(s: AirState) -> Self {
        MetaValue::State(Box::new(s))
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_owned())
    }
}

/// Process-specific metadata keyed by name.
pub type Metadata = BTreeMap<String, MetaValue>;

/// One state-to-state transformation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessResult {
    pub kind: ProcessKind,
    pub start: AirState,
    pub end: AirState,
    /// Chart path; first and last vertices are the start and end states.
    pub path: Vec<PathPoint>,
    pub metadata: Metadata,
    pub warnings: Vec<String>,
}

impl ProcessResult {
    pub fn new(kind: ProcessKind, start: AirState, end: AirState, path: Vec<PathPoint>) -> Self {
        Self {
            kind,
            start,
            end,
            path,
            metadata: Metadata::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Warnings) -> Self {
        self.warnings.extend(warnings.0);
        self
    }

    /// Numeric metadata entry, if present.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key) {
            Some(MetaValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    /// Nested state metadata entry, if present.
    pub fn state(&self, key: &str) -> Option<&AirState> {
        match self.metadata.get(key) {
            Some(MetaValue::State(s)) => Some(s),
            _ => None,
        }
    }
}

/// Physical warnings collected while solving; each is mirrored to the log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Warnings(Vec<String>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "process warning");
        self.0.push(message);
    }

    /// Takes over already-logged warnings from a nested solve.
    pub fn absorb(&mut self, other: impl IntoIterator<Item = String>) {
        self.0.extend(other);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// A process parameter set that can check itself and solve from a start state.
pub trait ProcessSolver {
    /// Checks every parameter without resolving any state.
    fn validate(&self) -> EngineResult<()>;

    /// Solves from `start`; the start state's conditions apply throughout.
    fn solve(&self, start: &AirState) -> EngineResult<ProcessResult>;
}

/// Parameters for any supported process, tagged by `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessParams {
    Sensible(SensibleParams),
    CoolingDehumidification(CoolingDehumParams),
    AdiabaticMixing(MixingParams),
    SteamHumidification(SteamParams),
    AdiabaticHumidification(AdiabaticHumidificationParams),
    HeatedWaterHumidification(HeatedWaterParams),
    DirectEvaporative(DirectEvaporativeParams),
    IndirectEvaporative(IndirectEvaporativeParams),
    IndirectDirectEvaporative(TwoStageEvaporativeParams),
    ChemicalDehumidification(ChemicalDehumParams),
}

impl ProcessParams {
    fn solver(&self) -> &dyn ProcessSolver {
        match self {
            ProcessParams::Sensible(p) => p,
            ProcessParams::CoolingDehumidification(p) => p,
            ProcessParams::AdiabaticMixing(p) => p,
            ProcessParams::SteamHumidification(p) => p,
            ProcessParams::AdiabaticHumidification(p) => p,
            ProcessParams::HeatedWaterHumidification(p) => p,
            ProcessParams::DirectEvaporative(p) => p,
            ProcessParams::IndirectEvaporative(p) => p,
            ProcessParams::IndirectDirectEvaporative(p) => p,
            ProcessParams::ChemicalDehumidification(p) => p,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.solver().validate()
    }
}

/// Validates `params`, then solves from `start`.
pub fn run(start: &AirState, params: &ProcessParams) -> EngineResult<ProcessResult> {
    let solver = params.solver();
    solver.validate()?;
    debug!(params = ?params, dry_bulb = start.dry_bulb(), "running process");
    solver.solve(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_deserialize_by_kind_tag() {
        let yaml = "kind: sensible\nmode:\n  target_dry_bulb: 75\n";
        let params: ProcessParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            params,
            ProcessParams::Sensible(SensibleParams {
                mode: SensibleMode::TargetDryBulb(75.0),
                reheat: false,
            })
        );

        let json = r#"{"kind":"cooling_dehumidification","mode":{"forward":{"adp_dry_bulb":45.0,"bypass_factor":0.15}}}"#;
        let params: ProcessParams = serde_json::from_str(json).unwrap();
        assert!(matches!(params, ProcessParams::CoolingDehumidification(_)));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let s = serde_json::to_string(&ProcessKind::IndirectDirectEvaporative).unwrap();
        assert_eq!(s, "\"indirect_direct_evaporative\"");
    }

    #[test]
    fn warnings_collect_in_order() {
        let mut w = Warnings::new();
        assert!(w.is_empty());
        w.push("first");
        w.absorb(vec!["second".to_owned()]);
        assert_eq!(w.into_vec(), vec!["first".to_owned(), "second".to_owned()]);
    }
}
