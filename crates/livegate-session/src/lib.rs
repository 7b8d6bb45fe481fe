//! Live session wiring for the risk gate.
//!
//! - `SessionConfig`: immutable session defaults loaded from TOML
//! - `LiveSession`: owns the switch gate state of one live session and
//!   records metrics for every decision

pub mod config;
pub mod error;
pub mod session;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use session::LiveSession;
