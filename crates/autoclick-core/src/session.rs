//! Session: wires input sources to the toggle controller and runs until the
//! exit key is pressed.

use crate::controller::ShutdownOutcome;
use crate::{
    Bindings, ClickEmitter, ClickSink, ClickerResult, Clock, EmitterConfig, InputEvent,
    InputSource, RateConfig, Settings, SystemClock, ToggleController,
};
use crossbeam_channel::bounded;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Capacity of the channel between input sources and the session.
const EVENT_BUFFER: usize = 1024;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The exit key was pressed.
    ExitKey,
    /// Every input source went away.
    SourcesClosed,
}

/// Summary of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub exit_reason: ExitReason,
    pub shutdown: ShutdownOutcome,
    pub total_clicks: u64,
    pub used_rate_fallback: bool,
}

/// One run of the auto clicker.
pub struct Session {
    settings: Settings,
    sink: Arc<dyn ClickSink>,
    clock: Arc<dyn Clock>,
    keyboard: Box<dyn InputSource>,
    pointer: Box<dyn InputSource>,
}

impl Session {
    pub fn new(
        settings: Settings,
        sink: Arc<dyn ClickSink>,
        keyboard: Box<dyn InputSource>,
        pointer: Box<dyn InputSource>,
    ) -> Self {
        Self {
            settings,
            sink,
            clock: Arc::new(SystemClock),
            keyboard,
            pointer,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run until the exit key is pressed.
    ///
    /// Fails if the toggle key cannot be resolved or a listener cannot be
    /// started. In the latter case every listener already started is stopped
    /// before the error is returned.
    pub fn run(self) -> ClickerResult<SessionReport> {
        let Session {
            settings,
            sink,
            clock,
            keyboard,
            pointer,
        } = self;

        let bindings = Bindings::resolve(
            settings.toggle_key.as_deref(),
            settings.toggle_button.as_deref(),
        )?;
        let rate = RateConfig::derive_text(&settings.rate.as_text());

        let emitter = ClickEmitter::new(
            EmitterConfig {
                interval: rate.config.interval(),
                poll_quantum: settings.poll_quantum(),
            },
            sink,
            clock,
        );
        let controller = ToggleController::new(bindings, emitter)
            .with_shutdown_timeout(settings.shutdown_timeout());

        info!("Starting auto clicker. {}", bindings.describe());

        let mut sources = vec![keyboard];
        if bindings.toggle_button.is_some() {
            sources.push(pointer);
        }

        let (event_tx, event_rx) = bounded::<InputEvent>(EVENT_BUFFER);
        let mut started: Vec<Box<dyn InputSource>> = Vec::with_capacity(sources.len());
        for mut source in sources {
            match source.start(event_tx.clone()) {
                Ok(()) => {
                    debug!(source = source.name(), "input source started");
                    started.push(source);
                }
                Err(e) => {
                    error!(source = source.name(), error = %e, "input source failed to start");
                    source.stop();
                    stop_sources(&mut started);
                    controller.shutdown();
                    return Err(e);
                }
            }
        }
        // Only the sources hold senders now, so the channel closes if they all die.
        drop(event_tx);

        let mut exit_shutdown = None;
        let exit_reason = loop {
            match event_rx.recv() {
                Ok(event) => {
                    if let Some(outcome) = dispatch(&controller, event) {
                        exit_shutdown = Some(outcome);
                        break ExitReason::ExitKey;
                    }
                }
                Err(_) => {
                    warn!("all input sources disconnected");
                    break ExitReason::SourcesClosed;
                }
            }
        };

        let shutdown = match exit_shutdown {
            Some(outcome) => outcome,
            None => controller.shutdown(),
        };
        stop_sources(&mut started);

        Ok(SessionReport {
            exit_reason,
            shutdown,
            total_clicks: controller.click_count(),
            used_rate_fallback: rate.used_fallback,
        })
    }
}

/// Route one event. Returns the shutdown outcome when it was the exit key.
fn dispatch(controller: &ToggleController, event: InputEvent) -> Option<ShutdownOutcome> {
    match event {
        InputEvent::KeyPress(key) => {
            if let Some(outcome) = controller.on_exit_key(key) {
                return Some(outcome);
            }
            controller.on_key_event(key);
        }
        InputEvent::KeyRelease(_) => {}
        InputEvent::ButtonPress(button) => {
            controller.on_button_event(button, true);
        }
        InputEvent::ButtonRelease(button) => {
            controller.on_button_event(button, false);
        }
    }
    None
}

fn stop_sources(sources: &mut [Box<dyn InputSource>]) {
    for source in sources.iter_mut().rev() {
        debug!(source = source.name(), "stopping input source");
        source.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingSink, ScriptedSource};
    use crate::{ButtonId, KeyId, EXIT_KEY};

    #[test]
    fn test_dispatch_routes_events() {
        let emitter = ClickEmitter::new(
            EmitterConfig::new(std::time::Duration::from_millis(5)),
            Arc::new(CountingSink::new()),
            Arc::new(SystemClock),
        );
        let bindings = Bindings::resolve(Some("c"), Some("middle")).unwrap();
        let controller = ToggleController::new(bindings, emitter);

        assert_eq!(dispatch(&controller, InputEvent::KeyRelease(KeyId::Char('c'))), None);
        assert!(!controller.is_armed());

        assert_eq!(dispatch(&controller, InputEvent::ButtonPress(ButtonId::Middle)), None);
        assert!(controller.is_armed());
        assert_eq!(dispatch(&controller, InputEvent::ButtonRelease(ButtonId::Middle)), None);
        assert!(controller.is_armed());

        assert_eq!(dispatch(&controller, InputEvent::KeyPress(KeyId::Char('c'))), None);
        assert!(!controller.is_armed());

        assert_eq!(
            dispatch(&controller, InputEvent::KeyPress(EXIT_KEY)),
            Some(ShutdownOutcome::Completed)
        );
    }

    #[test]
    fn test_unknown_key_fails_before_listening() {
        let (keyboard, kb_probe) = ScriptedSource::new("keyboard");
        let (pointer, _) = ScriptedSource::new("pointer");
        let settings = Settings {
            toggle_key: Some("banana".into()),
            ..Settings::default()
        };
        let session = Session::new(
            settings,
            Arc::new(CountingSink::new()),
            Box::new(keyboard),
            Box::new(pointer),
        );

        assert!(matches!(
            session.run(),
            Err(crate::ClickerError::UnknownKeyBinding(_))
        ));
        assert!(!kb_probe.is_started());
        assert_eq!(kb_probe.stop_count(), 0);
    }
}
