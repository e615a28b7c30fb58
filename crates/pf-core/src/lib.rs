//! pf-core: stable foundation for psychroflow.
//!
//! Contains:
//! - units (unit systems, chart ranges, uom boundary conversions)
//! - numeric (Real + tolerances + float helpers)

pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use numeric::*;
pub use units::*;
