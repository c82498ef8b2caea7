//! User settings and the config file they are loaded from.

use crate::controller::DEFAULT_SHUTDOWN_TIMEOUT;
use crate::emitter::{DEFAULT_POLL_QUANTUM, MAX_POLL_QUANTUM};
use crate::rate::DEFAULT_RATE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Effective configuration of a session.
///
/// The rate is kept as text so that unparsable values reach
/// `RateConfig::derive_text` and take the logged fallback path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Clicks per second.
    pub rate: RateSetting,
    /// Toggle key name or single character. `None` disables key toggling.
    pub toggle_key: Option<String>,
    /// Toggle mouse button (`left`, `right`, `middle`).
    pub toggle_button: Option<String>,
    /// Upper bound on a single sleep of the click loop, 1 to 10 ms.
    pub poll_quantum_ms: u64,
    /// How long shutdown waits for the click loop.
    pub shutdown_timeout_ms: u64,
}

/// A rate as written in a config file: a number or arbitrary text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateSetting {
    Number(f64),
    Text(String),
}

impl RateSetting {
    pub fn as_text(&self) -> String {
        match self {
            RateSetting::Number(n) => n.to_string(),
            RateSetting::Text(s) => s.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rate: RateSetting::Number(DEFAULT_RATE),
            toggle_key: Some("c".into()),
            toggle_button: None,
            poll_quantum_ms: DEFAULT_POLL_QUANTUM.as_millis() as u64,
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Settings {
    /// Poll quantum, clamped to `1..=MAX_POLL_QUANTUM` milliseconds.
    pub fn poll_quantum(&self) -> Duration {
        let max_ms = MAX_POLL_QUANTUM.as_millis() as u64;
        let ms = self.poll_quantum_ms.clamp(1, max_ms);
        if ms != self.poll_quantum_ms {
            warn!(
                requested = self.poll_quantum_ms,
                used = ms,
                "poll quantum out of range (1-{max_ms} ms)"
            );
        }
        Duration::from_millis(ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Parse settings from a file. `.json` files are JSON, anything else is
    /// YAML.
    pub fn load_from(path: &Path) -> SettingsResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let settings = if is_json {
            serde_json::from_str(&text).map_err(|source| SettingsError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_yaml::from_str(&text).map_err(|source| SettingsError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };

        debug!(?path, "Loaded settings");
        Ok(settings)
    }

    /// Load from `path` if given, else from the default config file if it
    /// exists, else defaults.
    pub fn load(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        let default_path = default_config_path();
        if default_path.is_file() {
            info!(path = ?default_path, "Using config file");
            return Self::load_from(&default_path);
        }
        Ok(Self::default())
    }
}

/// Get the config directory for autoclick.
pub fn get_config_dir() -> PathBuf {
    let base = dirs_next::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("autoclick")
}

/// `<config dir>/autoclick/config.yaml`.
pub fn default_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}
