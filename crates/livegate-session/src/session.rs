//! One live trading session.
//!
//! Owns the switch gate state across cycles. Every produced decision is
//! recorded in the Prometheus metrics; the components themselves never touch
//! telemetry.

use crate::config::SessionConfig;
use crate::error::SessionResult;
use livegate_core::RegimeState;
use livegate_risk::{
    EligibilityComposer, EligibilityDecision, GateContext, RegimeSwitchGate, SwitchOutcome,
};
use livegate_telemetry::Metrics;
use tracing::{debug, info, warn};

/// Risk gate session: immutable defaults plus the mutable switch state.
#[derive(Debug, Clone)]
pub struct LiveSession {
    id: String,
    composer: EligibilityComposer,
    gate: RegimeSwitchGate,
    cycles: u64,
}

impl LiveSession {
    /// Start a session from the initial switch state (bull, counters zero).
    pub fn new(id: impl Into<String>, config: &SessionConfig) -> SessionResult<Self> {
        Self::resume(id, config, RegimeState::default())
    }

    /// Start a session from a previously persisted switch state.
    pub fn resume(
        id: impl Into<String>,
        config: &SessionConfig,
        state: RegimeState,
    ) -> SessionResult<Self> {
        config.validate()?;

        let id = id.into();
        info!(
            session = %id,
            specialist = %state.active_specialist,
            strict = config.strict_validation,
            "live session started"
        );
        Metrics::active_specialist(state.active_specialist);

        Ok(Self {
            id,
            composer: config.composer(),
            gate: RegimeSwitchGate::with_state(state),
            cycles: 0,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of cycles that produced a decision.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Switch state to persist between cycles.
    pub fn state(&self) -> &RegimeState {
        self.gate.state()
    }

    pub fn composer(&self) -> &EligibilityComposer {
        &self.composer
    }

    /// Evaluate one cycle.
    ///
    /// # Errors
    /// `SessionError::Gate` when strict validation is on and a component
    /// fails. The cycle is not counted.
    pub fn evaluate(&mut self, ctx: &GateContext) -> SessionResult<EligibilityDecision> {
        let decision = match self.composer.compose(ctx, &mut self.gate) {
            Ok(decision) => decision,
            Err(err) => {
                warn!(
                    session = %self.id,
                    cycle = self.cycles + 1,
                    error = %err,
                    kind = err.kind(),
                    "cycle rejected by strict validation"
                );
                return Err(err.into());
            }
        };

        self.cycles += 1;
        record(&decision);

        debug!(
            session = %self.id,
            cycle = self.cycles,
            eligible = decision.eligible,
            specialist = %decision.active_specialist,
            "cycle evaluated"
        );

        Ok(decision)
    }

    /// Evaluate one cycle from its JSON mapping and return the decision as
    /// JSON.
    pub fn evaluate_json(&mut self, input: &str) -> SessionResult<serde_json::Value> {
        let ctx: GateContext = serde_json::from_str(input)?;
        let decision = self.evaluate(&ctx)?;
        Ok(serde_json::to_value(&decision)?)
    }
}

fn record(decision: &EligibilityDecision) {
    Metrics::decision(decision.active_specialist);
    Metrics::active_specialist(decision.active_specialist);
    Metrics::leverage(decision.leverage);
    Metrics::drift_paused(decision.drift_paused);

    match decision.details.double_play.outcome {
        Some(SwitchOutcome::Switched { to, .. }) => Metrics::specialist_switched(to),
        Some(SwitchOutcome::Rejected { blocker, .. }) => {
            Metrics::switch_rejected(blocker.as_str())
        }
        Some(SwitchOutcome::Stayed) | None => {}
    }

    for fault in &decision.fail_closed {
        Metrics::fail_closed(fault.component, fault.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use livegate_core::{GateError, Specialist};
    use livegate_risk::LeverageConfig;
    use livegate_telemetry::metrics::{FAIL_CLOSED_TOTAL, SPECIALIST_SWITCHES_TOTAL};

    fn session() -> LiveSession {
        LiveSession::new("test", &SessionConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected_at_start() {
        let config = SessionConfig {
            leverage: LeverageConfig {
                min_leverage: 5.0,
                max_leverage: 1.0,
                gamma: 2.0,
            },
            ..Default::default()
        };
        let err = LiveSession::new("bad", &config).unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
    }

    #[test]
    fn test_state_carries_across_cycles() {
        let mut session = session();
        let ctx = GateContext::default().with_double_play(None).with_score(-1.0);

        let decision = session.evaluate(&ctx).unwrap();
        assert_eq!(decision.active_specialist, Specialist::Bear);
        assert_eq!(session.state().hold_remaining, 3);

        let ctx = GateContext::default().with_double_play(None).with_score(1.0);
        let decision = session.evaluate(&ctx).unwrap();
        assert_eq!(decision.active_specialist, Specialist::Bear);
        assert_eq!(session.state().hold_remaining, 2);
        assert_eq!(session.cycles(), 2);
    }

    #[test]
    fn test_resume_from_persisted_state() {
        let state = RegimeState {
            active_specialist: Specialist::Bear,
            hold_remaining: 1,
            cooldown_remaining: 0,
        };
        let mut session = LiveSession::resume("resumed", &SessionConfig::default(), state).unwrap();
        assert_eq!(session.id(), "resumed");

        let ctx = GateContext::default().with_double_play(None).with_score(0.0);
        let decision = session.evaluate(&ctx).unwrap();
        assert_eq!(decision.active_specialist, Specialist::Bear);
        assert_eq!(session.state().hold_remaining, 0);
        assert!(session.state().is_switch_ready());
    }

    #[test]
    fn test_strict_error_is_not_counted() {
        let config = SessionConfig {
            strict_validation: true,
            ..Default::default()
        };
        let mut session = LiveSession::new("strict", &config).unwrap();
        let ctx = GateContext::default()
            .with_dynamic_leverage(None)
            .with_strength(f64::NAN);

        let err = session.evaluate(&ctx).unwrap_err();
        assert!(matches!(err, SessionError::Gate(GateError::InvalidInput(_))));
        assert_eq!(session.cycles(), 0);
    }

    #[test]
    fn test_evaluate_json() {
        let mut session = session();
        let out = session
            .evaluate_json(
                r#"{"strength": 0.5, "dynamic_leverage_enabled": true, "trading_eligible": true}"#,
            )
            .unwrap();
        assert_eq!(out["eligible"], true);
        assert_eq!(out["leverage"], 13.25);
        assert_eq!(out["details"]["dynamic_leverage"]["cap"], 50.0);
    }

    #[test]
    fn test_evaluate_json_parse_error() {
        let mut session = session();
        let err = session.evaluate_json("{not json").unwrap_err();
        assert!(matches!(err, SessionError::Parse(_)));
        assert_eq!(session.cycles(), 0);
    }

    #[test]
    fn test_switch_and_fault_metrics_recorded() {
        let switches = SPECIALIST_SWITCHES_TOTAL.with_label_values(&["bear"]).get();
        let faults = FAIL_CLOSED_TOTAL
            .with_label_values(&["dynamic_leverage", "invalid_input"])
            .get();

        let mut session = session();
        let ctx = GateContext::default()
            .with_double_play(None)
            .with_score(-1.0)
            .with_dynamic_leverage(None)
            .with_strength(f64::NAN);
        session.evaluate(&ctx).unwrap();

        assert!(SPECIALIST_SWITCHES_TOTAL.with_label_values(&["bear"]).get() >= switches + 1.0);
        assert!(
            FAIL_CLOSED_TOTAL
                .with_label_values(&["dynamic_leverage", "invalid_input"])
                .get()
                >= faults + 1.0
        );
    }
}
