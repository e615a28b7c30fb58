//! pf-props: moist-air property library for psychroflow.
//!
//! Provides:
//! - Saturation vapor pressure over ice and liquid water (Hyland–Wexler fits)
//! - Humidity ratio, dew point and wet bulb relations
//! - Enthalpy, specific volume and degree of saturation
//! - Standard-atmosphere barometric pressure
//!
//! # Architecture
//!
//! Every relation is evaluated natively in the unit system carried by a
//! [`Psychrometrics`] value. There is no global unit toggle, so adapters for IP
//! and SI can be used side by side from any thread.
//!
//! Relations without a closed-form inverse (dew point, wet bulb) are solved with
//! the bracketed root finder from `pf-solver`.
//!
//! # Example
//!
//! ```
//! use pf_core::UnitSystem;
//! use pf_props::Psychrometrics;
//!
//! let psy = Psychrometrics::new(UnitSystem::Si);
//! let w = psy.hum_ratio_from_rel_hum(25.0, 0.5, 101_325.0).unwrap();
//! let twb = psy.wet_bulb_from_hum_ratio(25.0, w, 101_325.0).unwrap();
//! assert!(twb > 17.0 && twb < 19.0);
//! ```

pub mod atmosphere;
pub mod error;
pub mod psychrometrics;
pub mod saturation;

pub use atmosphere::standard_pressure;
pub use error::{PropsError, PropsResult};
pub use psychrometrics::{MIN_HUM_RATIO, Psychrometrics};
pub use saturation::sat_vapor_pressure;
