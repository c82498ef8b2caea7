//! Test doubles for the OS seams: a manual clock, a counting click sink and
//! a scripted input source.

use crate::{ClickSink, ClickerError, ClickerResult, Clock, InputEvent, InputSource};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// A clock that only moves when told to. `sleep` advances it.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        // Start a day ahead of the real clock so `rewind` stays representable.
        Self {
            now: Mutex::new(Instant::now() + Duration::from_secs(86_400)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) += by;
    }

    /// Move the clock backward, as a wall-clock correction would.
    pub fn rewind(&self, by: Duration) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) -= by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
        thread::yield_now();
    }
}

/// Click sink that counts instead of clicking.
#[derive(Debug, Default)]
pub struct CountingSink {
    clicks: AtomicU64,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.clicks.load(Ordering::SeqCst)
    }
}

impl ClickSink for CountingSink {
    fn click(&self) -> Result<(), String> {
        self.clicks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ScriptedShared {
    events: Mutex<Option<Sender<InputEvent>>>,
    started: AtomicBool,
    stops: AtomicU32,
}

/// An input source whose events are pushed by the test through a
/// [`SourceProbe`].
#[derive(Debug)]
pub struct ScriptedSource {
    name: String,
    fail_on_start: bool,
    shared: Arc<ScriptedShared>,
}

/// Test-side control of a [`ScriptedSource`].
#[derive(Debug, Clone)]
pub struct SourceProbe {
    shared: Arc<ScriptedShared>,
}

impl ScriptedSource {
    pub fn new(name: &str) -> (Self, SourceProbe) {
        Self::build(name, false)
    }

    /// A source whose `start` always fails.
    pub fn failing(name: &str) -> (Self, SourceProbe) {
        Self::build(name, true)
    }

    fn build(name: &str, fail_on_start: bool) -> (Self, SourceProbe) {
        let shared = Arc::new(ScriptedShared::default());
        let source = Self {
            name: name.to_string(),
            fail_on_start,
            shared: shared.clone(),
        };
        (source, SourceProbe { shared })
    }
}

impl InputSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self, events: Sender<InputEvent>) -> ClickerResult<()> {
        if self.fail_on_start {
            return Err(ClickerError::ListenerStartFailure {
                source_name: self.name.clone(),
                reason: "scripted failure".into(),
            });
        }
        *self
            .shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(events);
        self.shared.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.shared.stops.fetch_add(1, Ordering::SeqCst);
        self.shared.started.store(false, Ordering::SeqCst);
        self.shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl SourceProbe {
    pub fn is_started(&self) -> bool {
        self.shared.started.load(Ordering::SeqCst)
    }

    /// Number of `stop` calls seen.
    pub fn stop_count(&self) -> u32 {
        self.shared.stops.load(Ordering::SeqCst)
    }

    /// Poll until the source has been started.
    pub fn wait_started(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.is_started() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        self.is_started()
    }

    /// Drop the event sender, as a listener thread dying would.
    pub fn disconnect(&self) {
        self.shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Publish an event. Returns false if the source is not running.
    pub fn send(&self, event: InputEvent) -> bool {
        let guard = self
            .shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }
}
