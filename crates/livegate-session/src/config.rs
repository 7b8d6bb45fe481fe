//! Session configuration.

use crate::error::{SessionError, SessionResult};
use livegate_core::GateError;
use livegate_risk::{DriftThresholds, EligibilityComposer, LeverageConfig, SwitchGateConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Session-wide defaults.
///
/// Each table is used whenever a cycle omits the matching policy block.
/// Immutable once the session is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Raise gate errors to the caller on every cycle instead of
    /// downgrading the affected feature.
    #[serde(default)]
    pub strict_validation: bool,
    #[serde(default)]
    pub leverage: LeverageConfig,
    #[serde(default)]
    pub switch_gate: SwitchGateConfig,
    #[serde(default)]
    pub drift: DriftThresholds,
}

impl SessionConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> SessionResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> SessionResult<Self> {
        toml::from_str(content)
            .map_err(|e| SessionError::Config(format!("Failed to parse config: {e}")))
    }

    /// Reject unusable defaults before the first cycle runs.
    pub fn validate(&self) -> SessionResult<()> {
        let section = |name: &str, err: GateError| {
            SessionError::Config(format!("[{name}] {err}"))
        };
        self.leverage
            .validate()
            .map_err(|e| section("leverage", e))?;
        self.switch_gate
            .validate()
            .map_err(|e| section("switch_gate", e))?;
        self.drift.validate().map_err(|e| section("drift", e))?;
        Ok(())
    }

    /// Build the composer carrying these defaults.
    pub fn composer(&self) -> EligibilityComposer {
        EligibilityComposer::new(self.leverage, self.switch_gate, self.drift)
            .with_strict_validation(self.strict_validation)
    }
}
