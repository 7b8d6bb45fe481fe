//! Session error types.

use livegate_core::GateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gate error: {0}")]
    Gate(#[from] GateError),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;
