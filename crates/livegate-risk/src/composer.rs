//! Eligibility composer: one decision record per cycle.
//!
//! Runs the switch gate, the leverage sizer and the drift monitor in that
//! order and merges their results. This is the only place where component
//! errors are caught: each failure disables the affected feature and is
//! explained in `reasons`. Strict validation (session- or cycle-level) turns
//! the first error into a `GateError` for the caller instead.
//!
//! # Safe defaults
//! Features are off unless their flag is set. A disabled feature is not
//! evaluated at all: its policy block is not parsed, the switch gate is not
//! stepped, and nothing it would have produced reaches the decision.
//!
//! # Eligibility
//! `eligible = trading_eligible && !drift_paused`. Nothing here can turn an
//! ineligible cycle into an eligible one.

use livegate_core::{DriftSeverity, GateError, GateResult};
use tracing::{debug, warn};

use crate::context::GateContext;
use crate::decision::{
    DecisionDetails, DoublePlayDetail, DriftDetail, EligibilityDecision, FailClosed,
    LeverageDetail,
};
use crate::drift::{DriftMonitor, DriftThresholds};
use crate::leverage::{clamp_strength, leverage, strength_in_domain, LeverageConfig};
use crate::switch_gate::{RegimeSwitchGate, SwitchGateConfig, SwitchOutcome};

const DOUBLE_PLAY: &str = "double_play";
const DYNAMIC_LEVERAGE: &str = "dynamic_leverage";
const DRIFT: &str = "drift";

/// Reasons and caught errors collected during one cycle, in evaluation order.
#[derive(Debug, Default)]
struct Reasons {
    all: Vec<String>,
    faults: Vec<FailClosed>,
}

impl Reasons {
    fn push(&mut self, component: &str, message: impl AsRef<str>) -> String {
        let line = format!("{component}: {}", message.as_ref());
        self.all.push(line.clone());
        line
    }

    fn fault(
        &mut self,
        component: &'static str,
        err: &GateError,
        message: impl AsRef<str>,
    ) -> String {
        self.faults.push(FailClosed {
            component,
            kind: err.kind(),
        });
        self.push(component, message)
    }
}

/// Orchestrates the gate components into an [`EligibilityDecision`].
///
/// Holds immutable session defaults; the switch gate state is passed in by
/// the owner of the session.
#[derive(Debug, Clone, Default)]
pub struct EligibilityComposer {
    leverage_defaults: LeverageConfig,
    switch_defaults: SwitchGateConfig,
    drift: DriftMonitor,
    strict_validation: bool,
}

impl EligibilityComposer {
    /// Create a composer with explicit session defaults.
    pub fn new(
        leverage_defaults: LeverageConfig,
        switch_defaults: SwitchGateConfig,
        drift_defaults: DriftThresholds,
    ) -> Self {
        Self {
            leverage_defaults,
            switch_defaults,
            drift: DriftMonitor::new(drift_defaults),
            strict_validation: false,
        }
    }

    /// Raise errors to the caller for every cycle, not only cycles that ask.
    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    pub fn leverage_defaults(&self) -> &LeverageConfig {
        &self.leverage_defaults
    }

    pub fn switch_defaults(&self) -> &SwitchGateConfig {
        &self.switch_defaults
    }

    pub fn drift_defaults(&self) -> &DriftThresholds {
        self.drift.defaults()
    }

    pub fn is_strict(&self) -> bool {
        self.strict_validation
    }

    /// Evaluate one cycle.
    ///
    /// Mutates `gate` only when double play is enabled and the cycle
    /// produces a decision.
    ///
    /// # Errors
    /// Only in strict mode: the first `GateError` met by any component. The
    /// gate is then left exactly as it was before the call.
    pub fn compose(
        &self,
        ctx: &GateContext,
        gate: &mut RegimeSwitchGate,
    ) -> GateResult<EligibilityDecision> {
        let strict = self.strict_validation || ctx.strict_validation;
        let snapshot = *gate.state();

        let result = self.evaluate(ctx, gate, strict);
        if let Err(err) = &result {
            *gate = RegimeSwitchGate::with_state(snapshot);
            debug!(error = %err, "cycle rejected, switch state rolled back");
        }
        result
    }

    fn evaluate(
        &self,
        ctx: &GateContext,
        gate: &mut RegimeSwitchGate,
        strict: bool,
    ) -> GateResult<EligibilityDecision> {
        let mut reasons = Reasons::default();

        // Phase 1: regime switch gate (the only stateful step)
        let double_play = self.evaluate_double_play(ctx, gate, strict, &mut reasons)?;

        // Phase 2: leverage sizing (pure)
        let dynamic_leverage = self.evaluate_leverage(ctx, strict, &mut reasons)?;

        // Phase 3: drift classification (pure)
        let drift = self.evaluate_drift(ctx, strict, &mut reasons)?;
        let drift_paused = drift.as_ref().is_some_and(|d| d.paused);

        // Phase 4: eligibility can only be tightened
        if !ctx.trading_eligible {
            reasons.push("eligibility", "external eligibility gate did not pass");
        } else if drift_paused {
            reasons.push("eligibility", "live trading paused by drift monitor");
        }
        let eligible = ctx.trading_eligible && !drift_paused;

        debug!(
            eligible,
            specialist = %double_play.active_specialist,
            double_play = double_play.enabled,
            leverage = ?dynamic_leverage.leverage,
            drift_paused,
            reasons = reasons.all.len(),
            "eligibility decision composed"
        );

        Ok(EligibilityDecision {
            eligible,
            active_specialist: double_play.active_specialist,
            switch_state: double_play.switch_state,
            leverage_enabled: dynamic_leverage.enabled,
            leverage: dynamic_leverage.leverage,
            regime_score: ctx.regime_score().and_then(Result::ok),
            double_play_enabled: double_play.enabled,
            drift_paused,
            reasons: reasons.all,
            fail_closed: reasons.faults,
            details: DecisionDetails {
                dynamic_leverage,
                double_play,
                drift,
            },
        })
    }

    fn evaluate_double_play(
        &self,
        ctx: &GateContext,
        gate: &mut RegimeSwitchGate,
        strict: bool,
        reasons: &mut Reasons,
    ) -> GateResult<DoublePlayDetail> {
        let mut local = Vec::new();

        if !ctx.double_play_enabled {
            local.push(reasons.push(DOUBLE_PLAY, "disabled (double_play_enabled=false)"));
            return Ok(double_play_detail(gate, false, local, None));
        }

        let block = ctx.switch_gate.as_ref();

        // Resume from caller-persisted state, if any.
        if let Some(raw) = block.and_then(|b| b.state.as_ref()) {
            if strict {
                gate.try_restore(raw)?;
            } else {
                for problem in gate.restore(raw) {
                    local.push(reasons.fault(DOUBLE_PLAY, &problem, problem.to_string()));
                }
            }
        }

        let cfg = match block.and_then(|b| b.cfg.as_ref()) {
            Some(policy) => policy.resolve("switch_gate.cfg"),
            None => Ok(self.switch_defaults),
        };

        let Some(score) = ctx.regime_score() else {
            if let Err(err) = cfg {
                return fail_double_play(gate, err, strict, reasons, local);
            }
            local.push(reasons.push(
                DOUBLE_PLAY,
                format!(
                    "no regime score supplied, holding {}",
                    gate.active_specialist()
                ),
            ));
            return Ok(double_play_detail(gate, true, local, None));
        };

        let stepped = cfg.and_then(|cfg| {
            let score = score?;
            gate.step(score, &cfg).map(|outcome| (score, outcome))
        });
        let (score, outcome) = match stepped {
            Ok(stepped) => stepped,
            Err(err) => return fail_double_play(gate, err, strict, reasons, local),
        };

        match outcome {
            SwitchOutcome::Switched { from, to } => {
                local.push(reasons.push(
                    DOUBLE_PLAY,
                    format!("switched {from} -> {to} on score {score}"),
                ));
            }
            SwitchOutcome::Rejected {
                candidate,
                blocker,
                remaining,
            } => {
                local.push(reasons.push(
                    DOUBLE_PLAY,
                    format!(
                        "switch to {candidate} rejected ({}_remaining={remaining})",
                        blocker.as_str()
                    ),
                ));
            }
            SwitchOutcome::Stayed => {}
        }

        Ok(double_play_detail(gate, true, local, Some(outcome)))
    }

    fn evaluate_leverage(
        &self,
        ctx: &GateContext,
        strict: bool,
        reasons: &mut Reasons,
    ) -> GateResult<LeverageDetail> {
        if !ctx.dynamic_leverage_enabled {
            reasons.push(
                DYNAMIC_LEVERAGE,
                "disabled (dynamic_leverage_enabled=false)",
            );
            return Ok(LeverageDetail {
                enabled: false,
                strength: ctx.strength.as_number(),
                leverage: None,
                cap: Some(self.leverage_defaults.max_leverage),
                gamma: Some(self.leverage_defaults.gamma),
            });
        }

        let cfg = match ctx.dynamic_leverage_cfg.as_ref() {
            Some(policy) => policy.resolve("dynamic_leverage_cfg"),
            None => Ok(self.leverage_defaults),
        };

        let sized = cfg.and_then(|cfg| {
            cfg.validate()?;
            let strength = ctx.strength.resolve("strength")?;
            leverage(strength, &cfg).map(|lev| (cfg, strength, lev))
        });
        match sized {
            Ok((cfg, strength, lev)) => {
                if !strength_in_domain(strength) {
                    reasons.push(
                        DYNAMIC_LEVERAGE,
                        format!(
                            "strength {strength} outside [0, 1], clamped to {}",
                            clamp_strength(strength)
                        ),
                    );
                }
                if lev >= cfg.max_leverage {
                    debug!(leverage = lev, cap = cfg.max_leverage, "leverage at ceiling");
                }
                Ok(LeverageDetail {
                    enabled: true,
                    strength: ctx.strength.as_number(),
                    leverage: Some(lev),
                    cap: Some(cfg.max_leverage),
                    gamma: Some(cfg.gamma),
                })
            }
            Err(err) => {
                if strict {
                    return Err(err);
                }
                warn!(error = %err, kind = err.kind(), "dynamic leverage disabled (fail-closed)");
                reasons.fault(
                    DYNAMIC_LEVERAGE,
                    &err,
                    format!("disabled ({}: {err})", err.kind()),
                );
                Ok(LeverageDetail {
                    enabled: false,
                    strength: ctx.strength.as_number(),
                    leverage: None,
                    cap: None,
                    gamma: None,
                })
            }
        }
    }

    fn evaluate_drift(
        &self,
        ctx: &GateContext,
        strict: bool,
        reasons: &mut Reasons,
    ) -> GateResult<Option<DriftDetail>> {
        if ctx.drift.is_empty() {
            return Ok(None);
        }

        let mut metrics = Vec::with_capacity(ctx.drift.len());
        let mut unclassified = false;

        for report in &ctx.drift {
            let classified = match self.drift.classify_report(report) {
                Ok(classified) => classified,
                Err(err) => {
                    if strict {
                        return Err(err);
                    }
                    // The unsafe outcome of drift is trading on; fail closed to paused.
                    warn!(error = %err, kind = err.kind(), "drift unclassifiable, pausing");
                    reasons.fault(
                        DRIFT,
                        &err,
                        format!(
                            "{}: unclassifiable ({}: {err}), pause",
                            report.metric,
                            err.kind()
                        ),
                    );
                    unclassified = true;
                    continue;
                }
            };

            match classified.severity {
                DriftSeverity::Critical => {
                    warn!(
                        metric = %classified.metric,
                        value = classified.value,
                        "critical drift, pause signalled"
                    );
                    reasons.push(
                        DRIFT,
                        format!(
                            "{} = {} is CRITICAL, pause",
                            classified.metric, classified.value
                        ),
                    );
                }
                DriftSeverity::Warn => {
                    reasons.push(
                        DRIFT,
                        format!("{} = {} is WARN", classified.metric, classified.value),
                    );
                }
                DriftSeverity::None => {}
            }
            metrics.push(classified);
        }

        let severity = metrics
            .iter()
            .map(|m| m.severity)
            .max()
            .unwrap_or(DriftSeverity::None);
        let paused = severity.triggers_pause() || unclassified;

        Ok(Some(DriftDetail {
            severity,
            paused,
            metrics,
        }))
    }
}

fn fail_double_play(
    gate: &RegimeSwitchGate,
    err: GateError,
    strict: bool,
    reasons: &mut Reasons,
    mut local: Vec<String>,
) -> GateResult<DoublePlayDetail> {
    if strict {
        return Err(err);
    }
    warn!(error = %err, kind = err.kind(), "double play disabled (fail-closed)");
    local.push(reasons.fault(
        DOUBLE_PLAY,
        &err,
        format!("disabled ({}: {err})", err.kind()),
    ));
    Ok(double_play_detail(gate, false, local, None))
}

fn double_play_detail(
    gate: &RegimeSwitchGate,
    enabled: bool,
    reasons: Vec<String>,
    outcome: Option<SwitchOutcome>,
) -> DoublePlayDetail {
    DoublePlayDetail {
        enabled,
        active_specialist: gate.active_specialist(),
        switch_state: *gate.state(),
        reasons,
        outcome,
    }
}
