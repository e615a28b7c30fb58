//! Bracketed scalar root finding for psychroflow.
//!
//! Property relations with no closed-form inverse are solved here: the caller
//! supplies an objective, a bracket that must straddle a sign change, and a
//! [`RootConfig`] bounding the work. Exhausting the budget is an error, never a
//! best-effort answer.

pub mod brent;
pub mod config;
pub mod error;

pub use brent::{Root, find_root};
pub use config::RootConfig;
pub use error::{SolverError, SolverResult};
