//! Psychrometric state and process engine for psychroflow.
//!
//! Resolves moist-air states from any supported property pair, runs HVAC
//! processes between states, and analyzes coils, SHR lines and air-handling
//! unit chains. Every operation is a pure function of its inputs; the unit
//! system and barometric pressure travel with each call in [`Conditions`].
//!
//! # Example
//!
//! ```
//! use pf_core::UnitSystem;
//! use pf_engine::{Conditions, Property, resolve};
//!
//! let conditions = Conditions::sea_level(UnitSystem::Ip);
//! let state = resolve(
//!     &conditions,
//!     (Property::DryBulb, 80.0),
//!     (Property::RelativeHumidity, 0.5),
//! )
//! .unwrap();
//! assert!((state.dew_point() - 59.7).abs() < 0.1);
//! ```

pub mod adp;
pub mod ahu;
pub mod airflow;
pub mod batch;
pub mod coil;
pub mod condensation;
pub mod conditions;
pub mod document;
pub mod effectiveness;
pub mod error;
pub mod path;
pub mod process;
pub mod request;
pub mod resolver;
pub mod shr;
pub mod state;

pub use adp::find_adp;
pub use ahu::{AhuKind, AhuParams, AhuResult, OutdoorMoisture, analyze_ahu};
pub use airflow::{AirflowInput, AirflowResult, LoadKind, SolveFor, c_factor, solve_load_equation};
pub use batch::{BatchEntry, execute_batch};
pub use coil::{CoilLoads, CoilParams, CoilResult, analyze_coil};
pub use condensation::{CondensationCheck, CondensationParams, check_condensation};
pub use conditions::Conditions;
pub use document::{DocumentError, DocumentResult, load_batch, load_request};
pub use error::{EngineError, EngineResult};
pub use path::{ChartPoint, PathPoint};
pub use process::{ProcessKind, ProcessParams, ProcessResult, ProcessSolver, run};
pub use request::{ConditionsSpec, Operation, Request, Response, execute};
pub use resolver::{resolve, resolve_dry_bulb_hum_ratio, resolve_saturated};
pub use shr::{GshrParams, GshrResult, ShrLine, grand_shr, shr_line, shr_slope};
pub use state::{AirState, InputPair, Property, StateSpec};
