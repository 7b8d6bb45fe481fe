//! Regime and drift domain types.
//!
//! Provides the specialist selector, the per-session switch state, and the
//! drift severity ladder shared by the gate components.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GateError;

/// Trading specialist selected by the regime switch gate.
///
/// Sign convention: a positive regime score favours `Bull`, a negative one
/// favours `Bear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialist {
    #[default]
    Bull,
    Bear,
}

impl Specialist {
    /// Returns the other specialist.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Bull => Self::Bear,
            Self::Bear => Self::Bull,
        }
    }

    /// Returns 1 for bull, -1 for bear (matches the score sign convention).
    pub fn sign(&self) -> i8 {
        match self {
            Self::Bull => 1,
            Self::Bear => -1,
        }
    }

    /// Label used in logs, metrics and the output mapping.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bull => "bull",
            Self::Bear => "bear",
        }
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialist {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bull" => Ok(Self::Bull),
            "bear" => Ok(Self::Bear),
            other => Err(GateError::StateCorruption(format!(
                "unknown specialist '{other}'"
            ))),
        }
    }
}

/// Switch state owned by one regime switch gate per live session.
///
/// Counters are unsigned, so they can never go negative once inside this
/// type; corrupt wire values are caught when a raw state is restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegimeState {
    /// Currently active specialist.
    pub active_specialist: Specialist,
    /// Steps before another switch is permitted after a switch.
    pub hold_remaining: u32,
    /// Steps before a switch may re-trigger.
    pub cooldown_remaining: u32,
}

impl RegimeState {
    /// Fresh session state: bull, both counters zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when neither counter blocks a switch.
    pub fn is_switch_ready(&self) -> bool {
        self.hold_remaining == 0 && self.cooldown_remaining == 0
    }

    /// Decrement both counters by one, floored at zero.
    pub fn decay(&mut self) {
        self.hold_remaining = self.hold_remaining.saturating_sub(1);
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }
}

/// Drift severity, ordered `None < Warn < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriftSeverity {
    #[default]
    None,
    Warn,
    Critical,
}

impl DriftSeverity {
    /// Only critical drift pauses live trading.
    pub fn triggers_pause(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl fmt::Display for DriftSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Warn => write!(f, "WARN"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialist_opposite_and_sign() {
        assert_eq!(Specialist::Bull.opposite(), Specialist::Bear);
        assert_eq!(Specialist::Bear.opposite(), Specialist::Bull);
        assert_eq!(Specialist::Bull.sign(), 1);
        assert_eq!(Specialist::Bear.sign(), -1);
    }

    #[test]
    fn test_specialist_parse() {
        assert_eq!("bull".parse::<Specialist>().unwrap(), Specialist::Bull);
        assert_eq!(" BEAR ".parse::<Specialist>().unwrap(), Specialist::Bear);
        let err = "sideways".parse::<Specialist>().unwrap_err();
        assert_eq!(err.kind(), "state_corruption");
    }

    #[test]
    fn test_specialist_serde_lowercase() {
        let json = serde_json::to_string(&Specialist::Bear).unwrap();
        assert_eq!(json, "\"bear\"");
    }

    #[test]
    fn test_regime_state_default() {
        let state = RegimeState::new();
        assert_eq!(state.active_specialist, Specialist::Bull);
        assert_eq!(state.hold_remaining, 0);
        assert_eq!(state.cooldown_remaining, 0);
        assert!(state.is_switch_ready());
    }

    #[test]
    fn test_regime_state_decay_floors_at_zero() {
        let mut state = RegimeState {
            active_specialist: Specialist::Bear,
            hold_remaining: 2,
            cooldown_remaining: 0,
        };
        state.decay();
        assert_eq!(state.hold_remaining, 1);
        assert_eq!(state.cooldown_remaining, 0);
        state.decay();
        state.decay();
        assert_eq!(state.hold_remaining, 0);
        assert!(state.is_switch_ready());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(DriftSeverity::None < DriftSeverity::Warn);
        assert!(DriftSeverity::Warn < DriftSeverity::Critical);
        assert!(DriftSeverity::Critical.triggers_pause());
        assert!(!DriftSeverity::Warn.triggers_pause());
        assert_eq!(
            serde_json::to_string(&DriftSeverity::Critical).unwrap(),
            "\"CRITICAL\""
        );
    }
}
