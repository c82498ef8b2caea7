//! `InputSource` implementations backed by the global rdev hook.

use crate::hook::{subscribe, EventFilter, HookSubscription};
use autoclick_core::{ClickerError, ClickerResult, InputEvent, InputSource};
use crossbeam_channel::Sender;
use tracing::info;

/// Listens to the global hook for one kind of event.
pub struct RdevSource {
    name: &'static str,
    filter: EventFilter,
    subscription: Option<HookSubscription>,
}

impl RdevSource {
    /// Key presses and releases.
    pub fn keyboard() -> Self {
        Self::new("keyboard", EventFilter::Keyboard)
    }

    /// Pointer button presses and releases.
    pub fn pointer() -> Self {
        Self::new("pointer", EventFilter::Pointer)
    }

    fn new(name: &'static str, filter: EventFilter) -> Self {
        Self {
            name,
            filter,
            subscription: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.subscription.is_some()
    }
}

impl InputSource for RdevSource {
    fn name(&self) -> &str {
        self.name
    }

    fn start(&mut self, events: Sender<InputEvent>) -> ClickerResult<()> {
        if self.subscription.is_some() {
            return Ok(());
        }
        let subscription =
            subscribe(self.filter, events).map_err(|e| ClickerError::ListenerStartFailure {
                source_name: self.name.to_string(),
                reason: e.to_string(),
            })?;
        self.subscription = Some(subscription);
        info!(source = self.name, "listener started");
        Ok(())
    }

    fn stop(&mut self) {
        if self.subscription.take().is_some() {
            info!(source = self.name, "listener stopped");
        }
    }
}

impl Drop for RdevSource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_before_start_is_harmless() {
        let mut source = RdevSource::pointer();
        assert_eq!(source.name(), "pointer");
        assert!(!source.is_running());
        source.stop();
        source.stop();
        assert!(!source.is_running());
    }
}
