//! Click rate validation and interval derivation.

use crate::emitter::MAX_INTERVAL;
use crate::ClickerError;
use std::time::Duration;
use tracing::{info, warn};

/// Rate used whenever the requested one is unusable.
pub const DEFAULT_RATE: f64 = 500.0;

/// A validated click rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateConfig {
    /// Clicks per second, always positive and finite.
    rate: f64,
    /// Seconds between clicks, `1 / rate`.
    interval_secs: f64,
}

/// Result of [`RateConfig::derive`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateDerivation {
    pub config: RateConfig,
    /// Set when the requested rate was replaced by [`DEFAULT_RATE`].
    pub used_fallback: bool,
}

impl RateConfig {
    /// Derive the click interval from a requested rate.
    ///
    /// Never fails: non-positive, NaN or infinite rates, and rates so small
    /// their interval exceeds [`MAX_INTERVAL`], fall back to [`DEFAULT_RATE`]
    /// and the substitution is logged.
    pub fn derive(requested: f64) -> RateDerivation {
        if requested.is_finite()
            && requested > 0.0
            && 1.0 / requested <= MAX_INTERVAL.as_secs_f64()
        {
            let config = Self::from_valid(requested);
            config.log_interval();
            return RateDerivation {
                config,
                used_fallback: false,
            };
        }
        Self::fallback(requested.to_string())
    }

    /// Like [`RateConfig::derive`], but for unparsed input such as a CLI
    /// argument. Text that is not a number takes the fallback path.
    pub fn derive_text(requested: &str) -> RateDerivation {
        match requested.trim().parse::<f64>() {
            Ok(rate) => Self::derive(rate),
            Err(_) => Self::fallback(requested.to_string()),
        }
    }

    fn fallback(requested: String) -> RateDerivation {
        let err = ClickerError::InvalidRate {
            requested,
            fallback: DEFAULT_RATE,
        };
        warn!("{err}");
        let config = Self::from_valid(DEFAULT_RATE);
        config.log_interval();
        RateDerivation {
            config,
            used_fallback: true,
        }
    }

    fn from_valid(rate: f64) -> Self {
        Self {
            rate,
            interval_secs: 1.0 / rate,
        }
    }

    fn log_interval(&self) {
        info!(
            "Click interval: {} seconds ({} CPS)",
            self.interval_secs, self.rate
        );
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self::from_valid(DEFAULT_RATE)
    }
}
