//! Click injection.

use crate::{PlatformError, PlatformResult};
use autoclick_core::ClickSink;
use enigo::{Button, Direction, Enigo, Mouse, Settings};
use std::sync::Mutex;
use tracing::{debug, trace};

/// Clicks the left button at the current pointer position via `enigo`.
pub struct EnigoClicker {
    enigo: Mutex<Enigo>,
}

impl EnigoClicker {
    /// Create a new EnigoClicker.
    pub fn new() -> PlatformResult<Self> {
        let settings = Settings::default();
        let enigo = Enigo::new(&settings).map_err(|e| {
            PlatformError::InjectionFailed(format!("failed to create Enigo: {e}"))
        })?;
        debug!("enigo click injector ready");
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    fn click_left(&self) -> PlatformResult<()> {
        let mut enigo = self
            .enigo
            .lock()
            .map_err(|_| PlatformError::InjectionFailed("enigo lock poisoned".into()))?;
        enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| PlatformError::InjectionFailed(e.to_string()))
    }
}

impl ClickSink for EnigoClicker {
    fn click(&self) -> Result<(), String> {
        self.click_left().map_err(|e| e.to_string())
    }
}

/// Click sink that only logs, for dry runs.
pub struct NoopClicker;

impl ClickSink for NoopClicker {
    fn click(&self) -> Result<(), String> {
        trace!("NoopClicker: would click");
        Ok(())
    }
}
