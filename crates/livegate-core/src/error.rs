//! Error types for livegate-core.

use thiserror::Error;

/// Errors raised by the gate components.
///
/// Leaf components return these directly. Only the eligibility composer is
/// allowed to downgrade them into a disabled feature plus a reason.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GateError {
    /// Non-numeric or out-of-range policy values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Per-cycle input outside its documented domain (e.g. NaN).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Switch state that can only come from a caller bug (negative counters,
    /// unknown specialist label).
    #[error("State corruption: {0}")]
    StateCorruption(String),
}

impl GateError {
    /// Stable snake_case label, used in reasons and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "invalid_config",
            Self::InvalidInput(_) => "invalid_input",
            Self::StateCorruption(_) => "state_corruption",
        }
    }
}

/// Result type alias for gate operations.
pub type GateResult<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(GateError::InvalidConfig("x".into()).kind(), "invalid_config");
        assert_eq!(GateError::InvalidInput("x".into()).kind(), "invalid_input");
        assert_eq!(
            GateError::StateCorruption("x".into()).kind(),
            "state_corruption"
        );
    }

    #[test]
    fn test_display_includes_detail() {
        let err = GateError::InvalidConfig("gamma 0.5 < 1".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: gamma 0.5 < 1");
    }
}
