//! Per-cycle decision record.
//!
//! Built fresh by the composer every cycle and never mutated after it is
//! returned. Leverage and specialist are sizing hints; `eligible` can only be
//! as permissive as the external eligibility verdict it was given.

use livegate_core::{DriftSeverity, RegimeState, Specialist};
use serde::Serialize;

use crate::drift::MetricDrift;
use crate::switch_gate::SwitchOutcome;

/// A feature that was disabled (or a state that was repaired) because a
/// component raised an error this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FailClosed {
    /// `double_play`, `dynamic_leverage` or `drift`.
    pub component: &'static str,
    /// `GateError::kind()` label.
    pub kind: &'static str,
}

/// `details["dynamic_leverage"]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeverageDetail {
    pub enabled: bool,
    /// Strength as supplied by the caller (before clamping); omitted if it
    /// was not a number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    /// Omitted whenever `enabled` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<f64>,
    /// Hard ceiling of the policy in force; omitted if the policy was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
}

/// `details["double_play"]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoublePlayDetail {
    pub enabled: bool,
    pub active_specialist: Specialist,
    /// Snapshot copy of the gate state after this cycle.
    pub switch_state: RegimeState,
    pub reasons: Vec<String>,
    /// Gate step result; `None` when the gate was not stepped.
    #[serde(skip)]
    pub outcome: Option<SwitchOutcome>,
}

/// `details["drift"]`, present only when drift inputs were supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftDetail {
    /// Worst severity among the classified metrics.
    pub severity: DriftSeverity,
    pub paused: bool,
    pub metrics: Vec<MetricDrift>,
}

/// The `details` mapping handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionDetails {
    pub dynamic_leverage: LeverageDetail,
    pub double_play: DoublePlayDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift: Option<DriftDetail>,
}

/// One decision per evaluation cycle, always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityDecision {
    /// External eligibility verdict, tightened by drift pause. Never relaxed.
    pub eligible: bool,
    pub active_specialist: Specialist,
    pub switch_state: RegimeState,
    pub leverage_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<f64>,
    pub regime_score: Option<f64>,
    pub double_play_enabled: bool,
    pub drift_paused: bool,
    /// Every disabled, clamped or rejected condition met this cycle, in
    /// evaluation order (switch gate, leverage, drift, eligibility).
    pub reasons: Vec<String>,
    /// Errors caught and downgraded this cycle.
    pub fail_closed: Vec<FailClosed>,
    pub details: DecisionDetails,
}

impl EligibilityDecision {
    /// Render the `details` mapping.
    pub fn details_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.details)
    }

    /// Worst drift severity this cycle (`NONE` when no drift was supplied).
    pub fn drift_severity(&self) -> DriftSeverity {
        self.details
            .drift
            .as_ref()
            .map_or(DriftSeverity::None, |d| d.severity)
    }
}
