//! Per-cycle input snapshot.
//!
//! Mirrors the caller's mapping: every key is optional and defaults to the
//! conservative value (features off, strength 0, not eligible).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use livegate_core::{GateError, GateResult};

use crate::drift::DriftReport;
use crate::leverage::LeverageConfig;
use crate::switch_gate::{RawRegimeState, SwitchGateConfig};

/// Policy block supplied by the caller.
///
/// A block that does not parse (e.g. a non-numeric `gamma`) is kept as
/// `Malformed` so it surfaces as `InvalidConfig` on use instead of failing
/// the whole snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyInput<T> {
    Parsed(T),
    Malformed(String),
}

impl<T> From<T> for PolicyInput<T> {
    fn from(value: T) -> Self {
        Self::Parsed(value)
    }
}

impl<T: Clone> PolicyInput<T> {
    /// Parsed policy, or `InvalidConfig` naming the block.
    pub fn resolve(&self, block: &str) -> GateResult<T> {
        match self {
            Self::Parsed(value) => Ok(value.clone()),
            Self::Malformed(msg) => Err(GateError::InvalidConfig(format!(
                "{block} is malformed: {msg}"
            ))),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for PolicyInput<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match serde_json::from_value(value) {
            Ok(parsed) => Self::Parsed(parsed),
            Err(err) => Self::Malformed(err.to_string()),
        })
    }
}

/// Per-cycle number supplied by the caller (strength, score, drift value).
///
/// Anything that is not a JSON number is kept as `Malformed` and only turns
/// into `InvalidInput` when the component that reads it runs. A disabled
/// feature never looks at its inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericInput {
    Number(f64),
    Malformed(String),
}

impl NumericInput {
    /// The number, or `InvalidInput` naming the field.
    pub fn resolve(&self, field: &str) -> GateResult<f64> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Malformed(raw) => Err(GateError::InvalidInput(format!(
                "{field} must be a number, got {raw}"
            ))),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Malformed(_) => None,
        }
    }
}

impl Default for NumericInput {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<'de> Deserialize<'de> for NumericInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value.as_f64() {
            Some(number) => Self::Number(number),
            None => Self::Malformed(value.to_string()),
        })
    }
}

impl Serialize for NumericInput {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Number(value) => serializer.serialize_f64(*value),
            Self::Malformed(raw) => serializer.serialize_str(raw),
        }
    }
}

/// `switch_gate` block: `{score, state?, cfg?}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SwitchGateInput {
    /// Regime score; falls back to the top-level `score` when absent.
    #[serde(default)]
    pub score: Option<NumericInput>,
    /// Caller-persisted state to resume from.
    #[serde(default)]
    pub state: Option<RawRegimeState>,
    /// Per-cycle policy override.
    #[serde(default)]
    pub cfg: Option<PolicyInput<SwitchGateConfig>>,
}

/// Full context snapshot for one evaluation cycle.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GateContext {
    /// Conviction strength, expected in `[0, 1]`.
    #[serde(default)]
    pub strength: NumericInput,
    /// Regime score (positive favours bull). `null` counts as absent.
    #[serde(default)]
    pub score: Option<NumericInput>,
    #[serde(default)]
    pub dynamic_leverage_enabled: bool,
    #[serde(default)]
    pub dynamic_leverage_cfg: Option<PolicyInput<LeverageConfig>>,
    #[serde(default)]
    pub double_play_enabled: bool,
    #[serde(default)]
    pub switch_gate: Option<SwitchGateInput>,
    /// Drift metrics for this cycle. Empty means no drift block in the output.
    #[serde(default)]
    pub drift: Vec<DriftReport>,
    /// Verdict of the external trading eligibility gate. This core can only
    /// tighten it.
    #[serde(default)]
    pub trading_eligible: bool,
    /// Raise `GateError` to the caller instead of downgrading.
    #[serde(default)]
    pub strict_validation: bool,
}

impl GateContext {
    /// Regime score for this cycle: `switch_gate.score`, else `score`.
    ///
    /// `None` when neither is supplied; `Some(Err(InvalidInput))` when the
    /// supplied value is not a number.
    pub fn regime_score(&self) -> Option<GateResult<f64>> {
        if let Some(score) = self.switch_gate.as_ref().and_then(|sg| sg.score.as_ref()) {
            return Some(score.resolve("switch_gate.score"));
        }
        self.score.as_ref().map(|score| score.resolve("score"))
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = NumericInput::Number(strength);
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(NumericInput::Number(score));
        self
    }

    pub fn with_dynamic_leverage(mut self, cfg: Option<LeverageConfig>) -> Self {
        self.dynamic_leverage_enabled = true;
        self.dynamic_leverage_cfg = cfg.map(PolicyInput::from);
        self
    }

    pub fn with_double_play(mut self, cfg: Option<SwitchGateConfig>) -> Self {
        self.double_play_enabled = true;
        let block = self.switch_gate.get_or_insert_with(SwitchGateInput::default);
        block.cfg = cfg.map(PolicyInput::from);
        self
    }

    pub fn with_drift(mut self, report: DriftReport) -> Self {
        self.drift.push(report);
        self
    }

    pub fn with_trading_eligible(mut self, eligible: bool) -> Self {
        self.trading_eligible = eligible;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_validation = true;
        self
    }
}
