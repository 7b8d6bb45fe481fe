//! Prometheus metrics and structured logging for the risk gate.
//!
//! - Prometheus metrics for decisions, switches and fail-closed downgrades
//! - Structured JSON logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogFormat};
pub use metrics::Metrics;
