//! Error types for autoclick-core.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the core.
///
/// Only `UnknownKeyBinding`, `ListenerStartFailure` and `Settings` abort a
/// session. The remaining variants are recovered locally and only reach the
/// log.
#[derive(Debug, Error)]
pub enum ClickerError {
    #[error("invalid rate {requested:?}, using default of {fallback} CPS")]
    InvalidRate { requested: String, fallback: f64 },
    #[error("unknown toggle key: {0:?}")]
    UnknownKeyBinding(String),
    #[error("unknown mouse button: {0:?} (valid options are: left, right, middle)")]
    UnknownButtonBinding(String),
    #[error("failed to start {source_name} listener: {reason}")]
    ListenerStartFailure { source_name: String, reason: String },
    #[error("click loop did not terminate within {0:?}")]
    EmitterJoinTimeout(Duration),
    #[error("failed to spawn click loop: {0}")]
    EmitterSpawn(#[from] std::io::Error),
    #[error("settings error: {0}")]
    Settings(#[from] crate::settings::SettingsError),
}

/// Result type for core operations.
pub type ClickerResult<T> = Result<T, ClickerError>;
