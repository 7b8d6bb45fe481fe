//! Prometheus metrics for the risk gate.
//!
//! Covers:
//! - Decisions per active specialist
//! - Specialist switches and rejected switch candidates
//! - Fail-closed downgrades per component and error kind
//! - Current leverage and drift pause state
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! (e.g. duplicate metric names) is a fatal startup error and must crash
//! immediately. These panics only occur during static initialization.

use livegate_core::Specialist;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Gauge, GaugeVec,
};

/// Decisions produced, by active specialist.
pub static DECISIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "livegate_decisions_total",
        "Total eligibility decisions produced",
        &["specialist"]
    )
    .unwrap()
});

/// Accepted specialist switches, by target specialist.
pub static SPECIALIST_SWITCHES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "livegate_specialist_switches_total",
        "Total accepted specialist switches",
        &["to"]
    )
    .unwrap()
});

/// Switch candidates rejected by a running counter.
/// Labels: blocker (hold/cooldown)
pub static SWITCH_REJECTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "livegate_switch_rejected_total",
        "Total switch candidates rejected by hold or cooldown",
        &["blocker"]
    )
    .unwrap()
});

/// Features disabled by a caught error.
/// Labels: component (double_play/dynamic_leverage/drift), kind (GateError kind)
pub static FAIL_CLOSED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "livegate_fail_closed_total",
        "Total fail-closed downgrades",
        &["component", "kind"]
    )
    .unwrap()
});

/// Leverage of the latest decision (0 = dynamic leverage disabled).
pub static LEVERAGE: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "livegate_leverage",
        "Leverage multiplier of the latest decision (0 = disabled)"
    )
    .unwrap()
});

/// Drift pause state of the latest decision (1 = paused).
pub static DRIFT_PAUSED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "livegate_drift_paused",
        "Drift pause state of the latest decision (1=paused)"
    )
    .unwrap()
});

/// Active specialist (1 = active, 0 = inactive).
pub static ACTIVE_SPECIALIST: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "livegate_active_specialist",
        "Active specialist (1=active, 0=inactive)",
        &["specialist"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a produced decision.
    pub fn decision(specialist: Specialist) {
        DECISIONS_TOTAL
            .with_label_values(&[specialist.as_str()])
            .inc();
    }

    /// Record an accepted switch.
    pub fn specialist_switched(to: Specialist) {
        SPECIALIST_SWITCHES_TOTAL
            .with_label_values(&[to.as_str()])
            .inc();
    }

    /// Record a rejected switch candidate.
    pub fn switch_rejected(blocker: &str) {
        SWITCH_REJECTED_TOTAL.with_label_values(&[blocker]).inc();
    }

    /// Record a fail-closed downgrade.
    pub fn fail_closed(component: &str, kind: &str) {
        FAIL_CLOSED_TOTAL
            .with_label_values(&[component, kind])
            .inc();
    }

    /// Set leverage gauge; `None` (disabled) records 0.
    pub fn leverage(leverage: Option<f64>) {
        LEVERAGE.set(leverage.unwrap_or(0.0));
    }

    /// Set drift pause gauge.
    pub fn drift_paused(paused: bool) {
        DRIFT_PAUSED.set(if paused { 1.0 } else { 0.0 });
    }

    /// Set the active specialist. Only the active one is 1.
    pub fn active_specialist(active: Specialist) {
        for s in [Specialist::Bull, Specialist::Bear] {
            let value = if s == active { 1.0 } else { 0.0 };
            ACTIVE_SPECIALIST
                .with_label_values(&[s.as_str()])
                .set(value);
        }
    }
}
