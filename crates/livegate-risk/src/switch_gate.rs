//! Regime switch gate: hysteresis state machine over bull/bear.
//!
//! # Band semantics
//! Positive scores favour bull, negative scores favour bear. The dead band is
//! symmetric, `[-hysteresis, +hysteresis]`:
//! - from bull, a candidate switch exists only when `score < -hysteresis`
//! - from bear, a candidate switch exists only when `score > +hysteresis`
//!
//! A score on the band edge does not cross it.
//!
//! # Transition rule
//! A candidate is accepted only when `hold_remaining == 0` and
//! `cooldown_remaining == 0` at the start of the cycle. An accepted switch
//! flips the specialist and reloads both counters from config. Every other
//! cycle (no candidate, or candidate rejected) decays both counters by one,
//! floored at zero. Rejections are silent: no error, only counter decay.
//!
//! Consecutive switches are therefore separated by at least
//! `max(min_hold_steps, cooldown_steps) + 1` cycles, and scores inside the
//! band never switch at all.

use livegate_core::{GateError, GateResult, RegimeState, Specialist};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Switch gate policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwitchGateConfig {
    /// Half-width of the dead band around zero. Must be finite and > 0.
    #[serde(default = "default_hysteresis")]
    pub hysteresis: f64,
    /// Cycles after a switch during which no further switch is permitted.
    #[serde(default = "default_min_hold_steps")]
    pub min_hold_steps: u32,
    /// Cycles after a switch before a switch may re-trigger.
    #[serde(default = "default_cooldown_steps")]
    pub cooldown_steps: u32,
}

fn default_hysteresis() -> f64 {
    0.25
}

fn default_min_hold_steps() -> u32 {
    3
}

fn default_cooldown_steps() -> u32 {
    3
}

impl Default for SwitchGateConfig {
    fn default() -> Self {
        Self {
            hysteresis: default_hysteresis(),
            min_hold_steps: default_min_hold_steps(),
            cooldown_steps: default_cooldown_steps(),
        }
    }
}

impl SwitchGateConfig {
    /// Hysteresis must be a finite, strictly positive number.
    pub fn validate(&self) -> GateResult<()> {
        if !self.hysteresis.is_finite() || self.hysteresis <= 0.0 {
            return Err(GateError::InvalidConfig(format!(
                "hysteresis must be finite and > 0, got {}",
                self.hysteresis
            )));
        }
        Ok(())
    }
}

/// Counter that blocked a candidate switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchBlocker {
    Hold,
    Cooldown,
}

impl SwitchBlocker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Cooldown => "cooldown",
        }
    }
}

/// Result of one gate step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwitchOutcome {
    /// Candidate accepted; the specialist flipped.
    Switched { from: Specialist, to: Specialist },
    /// Score stayed on the current side of the band.
    Stayed,
    /// Candidate existed but a counter was still running.
    Rejected {
        candidate: Specialist,
        blocker: SwitchBlocker,
        /// Counter value that blocked, as seen at the start of the cycle.
        remaining: u32,
    },
}

impl SwitchOutcome {
    pub fn is_switch(&self) -> bool {
        matches!(self, Self::Switched { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Switch state as it arrives from a caller that persists it between cycles.
///
/// Counters are signed on the wire so corrupt values can be detected instead
/// of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRegimeState {
    #[serde(default)]
    pub active_specialist: Option<String>,
    #[serde(default)]
    pub hold_remaining: i64,
    #[serde(default)]
    pub cooldown_remaining: i64,
}

impl From<RegimeState> for RawRegimeState {
    fn from(state: RegimeState) -> Self {
        Self {
            active_specialist: Some(state.active_specialist.to_string()),
            hold_remaining: i64::from(state.hold_remaining),
            cooldown_remaining: i64::from(state.cooldown_remaining),
        }
    }
}

impl RawRegimeState {
    /// Convert to a valid state, repairing only by clamping.
    ///
    /// Returns the repaired state plus one `StateCorruption` per problem found.
    /// Counters clamp into `[0, u32::MAX]`; an unknown specialist label falls
    /// back to the default specialist.
    pub fn sanitize(&self) -> (RegimeState, Vec<GateError>) {
        let mut problems = Vec::new();

        let active_specialist = match self.active_specialist.as_deref() {
            None => Specialist::default(),
            Some(label) => label.parse().unwrap_or_else(|err| {
                problems.push(err);
                Specialist::default()
            }),
        };

        let mut counter = |name: &str, value: i64| -> u32 {
            if value < 0 {
                problems.push(GateError::StateCorruption(format!(
                    "{name} {value} < 0, clamped to 0"
                )));
                return 0;
            }
            u32::try_from(value).unwrap_or_else(|_| {
                problems.push(GateError::StateCorruption(format!(
                    "{name} {value} > {}, clamped",
                    u32::MAX
                )));
                u32::MAX
            })
        };
        let hold_remaining = counter("hold_remaining", self.hold_remaining);
        let cooldown_remaining = counter("cooldown_remaining", self.cooldown_remaining);

        (
            RegimeState {
                active_specialist,
                hold_remaining,
                cooldown_remaining,
            },
            problems,
        )
    }
}

/// Hysteresis gate selecting the active specialist.
///
/// Owns its `RegimeState`; one instance per live session. Not idempotent:
/// every step advances the counters.
#[derive(Debug, Clone, Default)]
pub struct RegimeSwitchGate {
    state: RegimeState,
}

impl RegimeSwitchGate {
    /// Create a gate in the initial state (bull, counters zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gate resuming from a known-good state.
    pub fn with_state(state: RegimeState) -> Self {
        Self { state }
    }

    /// Current state.
    pub fn state(&self) -> &RegimeState {
        &self.state
    }

    /// Currently active specialist.
    pub fn active_specialist(&self) -> Specialist {
        self.state.active_specialist
    }

    /// Adopt a caller-persisted state.
    ///
    /// Corruption is clamped, logged and returned; it is never silently
    /// dropped.
    pub fn restore(&mut self, raw: &RawRegimeState) -> Vec<GateError> {
        let (state, problems) = raw.sanitize();
        for problem in &problems {
            error!(error = %problem, "switch state corruption detected");
        }
        self.state = state;
        problems
    }

    /// Adopt a caller-persisted state only if it is clean.
    ///
    /// On corruption the current state is kept and the first problem is
    /// returned.
    pub fn try_restore(&mut self, raw: &RawRegimeState) -> GateResult<()> {
        let (state, problems) = raw.sanitize();
        if let Some(problem) = problems.into_iter().next() {
            error!(error = %problem, "switch state corruption detected, restore refused");
            return Err(problem);
        }
        self.state = state;
        Ok(())
    }

    /// Advance the gate by one cycle.
    ///
    /// # Errors
    /// - `InvalidConfig` if `cfg` fails validation.
    /// - `InvalidInput` if `score` is NaN.
    ///
    /// On error the state is left untouched.
    pub fn step(&mut self, score: f64, cfg: &SwitchGateConfig) -> GateResult<SwitchOutcome> {
        cfg.validate()?;
        if score.is_nan() {
            return Err(GateError::InvalidInput(
                "regime score must be a number, got NaN".to_string(),
            ));
        }

        let current = self.state.active_specialist;
        let Some(candidate) = candidate_for(current, score, cfg.hysteresis) else {
            self.state.decay();
            return Ok(SwitchOutcome::Stayed);
        };

        if let Some((blocker, remaining)) = self.blocker() {
            debug!(
                current = %current,
                candidate = %candidate,
                blocker = blocker.as_str(),
                remaining,
                score,
                "switch candidate rejected"
            );
            self.state.decay();
            return Ok(SwitchOutcome::Rejected {
                candidate,
                blocker,
                remaining,
            });
        }

        self.state = RegimeState {
            active_specialist: candidate,
            hold_remaining: cfg.min_hold_steps,
            cooldown_remaining: cfg.cooldown_steps,
        };
        debug!(
            from = %current,
            to = %candidate,
            score,
            hold_remaining = cfg.min_hold_steps,
            cooldown_remaining = cfg.cooldown_steps,
            "specialist switched"
        );

        Ok(SwitchOutcome::Switched {
            from: current,
            to: candidate,
        })
    }

    fn blocker(&self) -> Option<(SwitchBlocker, u32)> {
        if self.state.hold_remaining > 0 {
            return Some((SwitchBlocker::Hold, self.state.hold_remaining));
        }
        if self.state.cooldown_remaining > 0 {
            return Some((SwitchBlocker::Cooldown, self.state.cooldown_remaining));
        }
        None
    }
}

/// Specialist the score argues for, if it crosses the band away from `current`.
fn candidate_for(current: Specialist, score: f64, hysteresis: f64) -> Option<Specialist> {
    match current {
        Specialist::Bull if score < -hysteresis => Some(Specialist::Bear),
        Specialist::Bear if score > hysteresis => Some(Specialist::Bull),
        _ => None,
    }
}
