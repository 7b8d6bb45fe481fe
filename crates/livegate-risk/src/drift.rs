//! Drift monitor: classifies live-vs-backtest drift metrics.
//!
//! Severity is a pure function of the metric value and its thresholds:
//! - `value > critical` -> `CRITICAL` (pause)
//! - `value > warn` -> `WARN`
//! - otherwise `NONE`
//!
//! The monitor only classifies. Acting on a pause belongs to the session or
//! execution layer.

use livegate_core::{DriftSeverity, GateError, GateResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::NumericInput;

/// Classification boundaries for one drift metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftThresholds {
    /// Values above this are `WARN`. `None` disables the warn band.
    #[serde(default = "default_warn")]
    pub warn: Option<f64>,
    /// Values above this are `CRITICAL` and trigger a pause.
    #[serde(default = "default_critical")]
    pub critical: f64,
}

fn default_warn() -> Option<f64> {
    Some(2.0)
}

fn default_critical() -> f64 {
    3.0
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            warn: default_warn(),
            critical: default_critical(),
        }
    }
}

impl DriftThresholds {
    /// Thresholds must be finite and ordered `warn <= critical`.
    pub fn validate(&self) -> GateResult<()> {
        if !self.critical.is_finite() {
            return Err(GateError::InvalidConfig(format!(
                "critical threshold must be finite, got {}",
                self.critical
            )));
        }
        if let Some(warn) = self.warn {
            if !warn.is_finite() {
                return Err(GateError::InvalidConfig(format!(
                    "warn threshold must be finite, got {warn}"
                )));
            }
            if warn > self.critical {
                return Err(GateError::InvalidConfig(format!(
                    "warn threshold {warn} > critical threshold {}",
                    self.critical
                )));
            }
        }
        Ok(())
    }
}

/// Drift input snapshot for one named metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Metric name (e.g. "fill_rate_z").
    pub metric: String,
    /// Observed value. Non-numeric values are rejected when classified.
    pub value: NumericInput,
    /// Per-metric boundaries; the monitor defaults apply when absent.
    #[serde(default)]
    pub thresholds: Option<DriftThresholds>,
}

impl DriftReport {
    pub fn new(metric: impl Into<String>, value: f64) -> Self {
        Self {
            metric: metric.into(),
            value: NumericInput::Number(value),
            thresholds: None,
        }
    }

    pub fn with_thresholds(mut self, thresholds: DriftThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
}

/// Output of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriftClassification {
    pub severity: DriftSeverity,
    pub triggers_pause: bool,
}

/// Classify a single metric value.
///
/// # Errors
/// - `InvalidConfig` if the thresholds fail validation.
/// - `InvalidInput` if `value` is NaN.
pub fn classify(value: f64, thresholds: &DriftThresholds) -> GateResult<DriftClassification> {
    thresholds.validate()?;
    if value.is_nan() {
        return Err(GateError::InvalidInput(
            "drift metric must be a number, got NaN".to_string(),
        ));
    }

    let severity = if value > thresholds.critical {
        DriftSeverity::Critical
    } else if thresholds.warn.is_some_and(|warn| value > warn) {
        DriftSeverity::Warn
    } else {
        DriftSeverity::None
    };

    Ok(DriftClassification {
        severity,
        triggers_pause: severity.triggers_pause(),
    })
}

/// Per-metric classification recorded in the decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDrift {
    pub metric: String,
    pub value: f64,
    pub severity: DriftSeverity,
}

/// Drift monitor with session-level default thresholds.
#[derive(Debug, Clone, Default)]
pub struct DriftMonitor {
    defaults: DriftThresholds,
}

impl DriftMonitor {
    pub fn new(defaults: DriftThresholds) -> Self {
        Self { defaults }
    }

    /// Default thresholds applied to reports without their own.
    pub fn defaults(&self) -> &DriftThresholds {
        &self.defaults
    }

    /// Classify one report, falling back to the default thresholds.
    pub fn classify_report(&self, report: &DriftReport) -> GateResult<MetricDrift> {
        let thresholds = report.thresholds.as_ref().unwrap_or(&self.defaults);
        let classified = report
            .value
            .resolve("value")
            .and_then(|value| classify(value, thresholds).map(|c| (value, c)));
        let (value, classification) = classified.map_err(|err| match err {
            GateError::InvalidConfig(msg) => {
                GateError::InvalidConfig(format!("{}: {msg}", report.metric))
            }
            GateError::InvalidInput(msg) => {
                GateError::InvalidInput(format!("{}: {msg}", report.metric))
            }
            other => other,
        })?;

        debug!(
            metric = %report.metric,
            value,
            severity = %classification.severity,
            "drift classified"
        );

        Ok(MetricDrift {
            metric: report.metric.clone(),
            value,
            severity: classification.severity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(warn: Option<f64>, critical: f64) -> DriftThresholds {
        DriftThresholds { warn, critical }
    }

    #[test]
    fn test_classify_levels() {
        let t = thresholds(Some(1.0), 2.0);
        assert_eq!(classify(0.5, &t).unwrap().severity, DriftSeverity::None);
        assert_eq!(classify(1.5, &t).unwrap().severity, DriftSeverity::Warn);
        let critical = classify(2.5, &t).unwrap();
        assert_eq!(critical.severity, DriftSeverity::Critical);
        assert!(critical.triggers_pause);
    }

    #[test]
    fn test_classify_boundaries_are_exclusive() {
        let t = thresholds(Some(1.0), 2.0);
        assert_eq!(classify(1.0, &t).unwrap().severity, DriftSeverity::None);
        assert_eq!(classify(2.0, &t).unwrap().severity, DriftSeverity::Warn);
    }

    #[test]
    fn test_only_critical_pauses() {
        let t = thresholds(Some(1.0), 2.0);
        assert!(!classify(1.5, &t).unwrap().triggers_pause);
        assert!(!classify(0.0, &t).unwrap().triggers_pause);
    }

    #[test]
    fn test_no_warn_band() {
        let t = thresholds(None, 2.0);
        assert_eq!(classify(1.9, &t).unwrap().severity, DriftSeverity::None);
        assert_eq!(classify(2.1, &t).unwrap().severity, DriftSeverity::Critical);
    }

    #[test]
    fn test_infinite_value_is_critical() {
        let t = DriftThresholds::default();
        assert_eq!(
            classify(f64::INFINITY, &t).unwrap().severity,
            DriftSeverity::Critical
        );
    }

    #[test]
    fn test_nan_value_is_invalid_input() {
        let err = classify(f64::NAN, &DriftThresholds::default()).unwrap_err();
        assert!(matches!(err, GateError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_thresholds() {
        for bad in [
            thresholds(Some(3.0), 2.0),
            thresholds(Some(f64::NAN), 2.0),
            thresholds(Some(1.0), f64::NAN),
            thresholds(None, f64::INFINITY),
        ] {
            let err = classify(1.0, &bad).unwrap_err();
            assert!(matches!(err, GateError::InvalidConfig(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let t = DriftThresholds::default();
        assert_eq!(classify(2.5, &t).unwrap(), classify(2.5, &t).unwrap());
    }

    #[test]
    fn test_monitor_uses_defaults_and_overrides() {
        let monitor = DriftMonitor::new(thresholds(Some(1.0), 2.0));

        let report = DriftReport::new("slippage_bps_z", 1.5);
        assert_eq!(
            monitor.classify_report(&report).unwrap().severity,
            DriftSeverity::Warn
        );

        let report = DriftReport::new("slippage_bps_z", 1.5)
            .with_thresholds(thresholds(Some(0.5), 1.2));
        assert_eq!(
            monitor.classify_report(&report).unwrap().severity,
            DriftSeverity::Critical
        );
    }

    #[test]
    fn test_monitor_error_names_metric() {
        let monitor = DriftMonitor::default();
        let err = monitor
            .classify_report(&DriftReport::new("fill_rate_z", f64::NAN))
            .unwrap_err();
        assert!(err.to_string().contains("fill_rate_z"));
    }

    #[test]
    fn test_report_json_defaults() {
        let report: DriftReport =
            serde_json::from_str(r#"{"metric": "pnl_gap", "value": 0.7}"#).unwrap();
        assert_eq!(report.metric, "pnl_gap");
        assert!(report.thresholds.is_none());

        let report: DriftReport = serde_json::from_str(
            r#"{"metric": "pnl_gap", "value": 0.7, "thresholds": {"critical": 5.0}}"#,
        )
        .unwrap();
        let t = report.thresholds.unwrap();
        assert_eq!(t.critical, 5.0);
        assert_eq!(t.warn, Some(2.0));
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_non_numeric_value_is_invalid_input() {
        let report: DriftReport =
            serde_json::from_str(r#"{"metric": "pnl_gap", "value": "n/a"}"#).unwrap();
        let err = DriftMonitor::default().classify_report(&report).unwrap_err();
        assert_eq!(
            err,
            GateError::InvalidInput("pnl_gap: value must be a number, got \"n/a\"".to_string())
        );
    }
}
