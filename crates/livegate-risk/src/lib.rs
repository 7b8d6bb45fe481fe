//! Live-trading risk gating.
//!
//! Decides, once per evaluation cycle:
//! - LeverageSizer: conviction strength -> bounded leverage multiplier
//! - RegimeSwitchGate: hysteresis state machine picking the bull/bear specialist
//! - DriftMonitor: NONE/WARN/CRITICAL drift classification, pause on CRITICAL
//! - EligibilityComposer: merges the above into one fail-closed decision record
//!
//! The crate never places orders, never performs I/O and never relaxes the
//! external trading eligibility verdict.

pub mod composer;
pub mod context;
pub mod decision;
pub mod drift;
pub mod leverage;
pub mod switch_gate;

pub use composer::EligibilityComposer;
pub use context::{GateContext, NumericInput, PolicyInput, SwitchGateInput};
pub use decision::{
    DecisionDetails, DoublePlayDetail, DriftDetail, EligibilityDecision, FailClosed,
    LeverageDetail,
};
pub use drift::{
    classify, DriftClassification, DriftMonitor, DriftReport, DriftThresholds, MetricDrift,
};
pub use leverage::{leverage, LeverageConfig, DEFAULT_MAX_LEVERAGE};
pub use livegate_core::{DriftSeverity, GateError, GateResult, RegimeState, Specialist};
pub use switch_gate::{
    RawRegimeState, RegimeSwitchGate, SwitchBlocker, SwitchGateConfig, SwitchOutcome,
};
