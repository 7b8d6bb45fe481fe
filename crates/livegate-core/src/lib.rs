//! Core domain types for the live-trading risk gate.
//!
//! This crate provides the types shared by every gate component:
//! - `Specialist`: bull/bear trading policy selector
//! - `RegimeState`: per-session hysteresis state (specialist + counters)
//! - `DriftSeverity`: `NONE < WARN < CRITICAL` classification ladder
//! - `GateError`: fail-closed error kinds

pub mod error;
pub mod types;

pub use error::{GateError, GateResult};
pub use types::{DriftSeverity, RegimeState, Specialist};
