//! Conviction-to-leverage sizing.
//!
//! `L(s) = min_leverage + (max_leverage - min_leverage) * s^gamma`, clamped to
//! `[min_leverage, max_leverage]`.
//!
//! `max_leverage` is a hard ceiling. Strength outside `[0, 1]` is clamped to the
//! boundary before the curve is evaluated; NaN strength and invalid policy are
//! rejected, never approximated.

use livegate_core::{GateError, GateResult};
use serde::{Deserialize, Serialize};

/// Hard ceiling applied by the built-in policy.
pub const DEFAULT_MAX_LEVERAGE: f64 = 50.0;

/// Dynamic leverage policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverageConfig {
    /// Leverage at zero conviction. Must be >= 0.
    #[serde(default = "default_min_leverage")]
    pub min_leverage: f64,
    /// Hard ceiling. Must be >= `min_leverage`.
    #[serde(default = "default_max_leverage")]
    pub max_leverage: f64,
    /// Convexity exponent. Must be >= 1 so the curve stays monotonic.
    #[serde(default = "default_gamma")]
    pub gamma: f64,
}

fn default_min_leverage() -> f64 {
    1.0
}

fn default_max_leverage() -> f64 {
    DEFAULT_MAX_LEVERAGE
}

fn default_gamma() -> f64 {
    2.0
}

impl Default for LeverageConfig {
    fn default() -> Self {
        Self {
            min_leverage: default_min_leverage(),
            max_leverage: default_max_leverage(),
            gamma: default_gamma(),
        }
    }
}

impl LeverageConfig {
    /// Reject NaN/non-finite values and out-of-range bounds.
    pub fn validate(&self) -> GateResult<()> {
        for (name, value) in [
            ("min_leverage", self.min_leverage),
            ("max_leverage", self.max_leverage),
            ("gamma", self.gamma),
        ] {
            if !value.is_finite() {
                return Err(GateError::InvalidConfig(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
        }

        if self.min_leverage < 0.0 {
            return Err(GateError::InvalidConfig(format!(
                "min_leverage {} < 0",
                self.min_leverage
            )));
        }
        if self.max_leverage < self.min_leverage {
            return Err(GateError::InvalidConfig(format!(
                "max_leverage {} < min_leverage {}",
                self.max_leverage, self.min_leverage
            )));
        }
        if self.gamma < 1.0 {
            return Err(GateError::InvalidConfig(format!(
                "gamma {} < 1",
                self.gamma
            )));
        }

        Ok(())
    }
}

/// Clamp strength into `[0, 1]`. NaN is returned unchanged.
pub fn clamp_strength(strength: f64) -> f64 {
    if strength.is_nan() {
        return strength;
    }
    strength.clamp(0.0, 1.0)
}

/// True when `strength` lies inside `[0, 1]`.
pub fn strength_in_domain(strength: f64) -> bool {
    (0.0..=1.0).contains(&strength)
}

/// Map conviction strength to a bounded leverage multiplier.
///
/// Deterministic and monotonic non-decreasing in `strength` for a fixed
/// config. The result is always inside `[min_leverage, max_leverage]`.
///
/// # Errors
/// - `InvalidConfig` if the policy fails [`LeverageConfig::validate`].
/// - `InvalidInput` if `strength` is NaN.
pub fn leverage(strength: f64, cfg: &LeverageConfig) -> GateResult<f64> {
    cfg.validate()?;

    if strength.is_nan() {
        return Err(GateError::InvalidInput(
            "strength must be a number, got NaN".to_string(),
        ));
    }

    let s = clamp_strength(strength);
    let span = cfg.max_leverage - cfg.min_leverage;
    let raw = cfg.min_leverage + span * s.powf(cfg.gamma);

    // Absorb floating-point overshoot at either end.
    Ok(raw.clamp(cfg.min_leverage, cfg.max_leverage))
}
