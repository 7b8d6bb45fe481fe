//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "info,livegate=debug";

/// Output format picked from `RUST_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, with span context.
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

impl LogFormat {
    /// `production` selects JSON; anything else, including unset, is pretty.
    pub fn from_env_value(rust_env: Option<&str>) -> Self {
        match rust_env {
            Some("production") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Filter for the given `RUST_LOG` value, falling back to [`DEFAULT_FILTER`].
pub fn filter_for(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize structured logging from `RUST_LOG` and `RUST_ENV`.
///
/// Fails (instead of panicking) if a global subscriber is already set.
pub fn init_logging() -> TelemetryResult<()> {
    let env_filter = filter_for(std::env::var("RUST_LOG").ok().as_deref());
    let format = LogFormat::from_env_value(std::env::var("RUST_ENV").ok().as_deref());

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
