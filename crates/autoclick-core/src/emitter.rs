//! Click emitter: the background loop that issues clicks while armed.
//!
//! The loop owns no lock. It polls two atomic flags (`armed`, `stop`) written
//! by the controller and sleeps at most one poll quantum between checks, so
//! a toggle or stop request is observed within that bound.

use crate::{ClickSink, ClickerResult, Clock};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on how long the loop sleeps between flag checks.
pub const DEFAULT_POLL_QUANTUM: Duration = Duration::from_millis(10);

/// Largest poll quantum the loop honours. Toggle latency and stop
/// observation are bounded by it, and the shutdown join relies on that.
pub const MAX_POLL_QUANTUM: Duration = Duration::from_millis(10);

/// Longest interval between clicks. Longer intervals are clamped so that
/// deadline arithmetic on `Instant` cannot overflow.
pub const MAX_INTERVAL: Duration = Duration::from_secs(86_400);

/// Timing configuration for the click loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterConfig {
    /// Time between clicks while armed, at most [`MAX_INTERVAL`].
    pub interval: Duration,
    /// Upper bound on a single sleep, at most [`MAX_POLL_QUANTUM`].
    pub poll_quantum: Duration,
}

impl EmitterConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            poll_quantum: DEFAULT_POLL_QUANTUM,
        }
    }
}

/// State shared between the emitter and its loop thread.
#[derive(Debug, Default)]
struct EmitterShared {
    armed: AtomicBool,
    stop: AtomicBool,
    clicks: AtomicU64,
}

/// Result of waiting for the loop to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The loop exited and its thread was joined.
    Joined,
    /// The loop was still running when the timeout elapsed; its thread is
    /// detached.
    TimedOut,
}

/// Handle to the one live loop thread.
pub struct EmitterHandle {
    thread: JoinHandle<()>,
    /// Disconnects when the loop thread exits, panics included.
    done_rx: Receiver<()>,
}

impl EmitterHandle {
    pub fn is_alive(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Wait up to `timeout` for the loop to exit.
    pub fn join_timeout(self, timeout: Duration) -> JoinOutcome {
        match self.done_rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => JoinOutcome::TimedOut,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.thread.join().is_err() {
                    warn!("click loop panicked");
                }
                JoinOutcome::Joined
            }
        }
    }
}

/// Owns the click loop and the flags that drive it.
pub struct ClickEmitter {
    config: EmitterConfig,
    shared: Arc<EmitterShared>,
    sink: Arc<dyn ClickSink>,
    clock: Arc<dyn Clock>,
    handle: Option<EmitterHandle>,
    spawn_count: u32,
}

impl ClickEmitter {
    pub fn new(config: EmitterConfig, sink: Arc<dyn ClickSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            shared: Arc::new(EmitterShared::default()),
            sink,
            clock,
            handle: None,
            spawn_count: 0,
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Start the loop unless one is already alive.
    ///
    /// Returns `true` when a new thread was spawned. Never spawns once a stop
    /// has been requested.
    pub fn ensure_running(&mut self) -> ClickerResult<bool> {
        if self.is_alive() || self.stop_requested() {
            return Ok(false);
        }

        let (done_tx, done_rx) = bounded::<()>(1);
        let shared = self.shared.clone();
        let sink = self.sink.clone();
        let clock = self.clock.clone();
        let config = self.config;

        let thread = thread::Builder::new()
            .name("click-loop".into())
            .spawn(move || {
                run_loop(&shared, sink.as_ref(), clock.as_ref(), config, done_tx);
            })?;

        self.spawn_count += 1;
        debug!(spawn_count = self.spawn_count, "click loop spawned");
        self.handle = Some(EmitterHandle { thread, done_rx });
        Ok(true)
    }

    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(EmitterHandle::is_alive)
    }

    pub fn set_armed(&self, armed: bool) {
        self.shared.armed.store(armed, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.shared.armed.load(Ordering::Acquire)
    }

    /// Ask the loop to exit. It returns within one poll quantum.
    pub fn request_stop(&self) {
        self.shared.armed.store(false, Ordering::Release);
        self.shared.stop.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.shared.stop.load(Ordering::Acquire)
    }

    /// Detach the loop handle, e.g. to join it without holding a lock.
    pub fn take_handle(&mut self) -> Option<EmitterHandle> {
        self.handle.take()
    }

    /// Clicks issued since construction.
    pub fn click_count(&self) -> u64 {
        self.shared.clicks.load(Ordering::Acquire)
    }

    /// Number of loop threads ever spawned by this emitter.
    pub fn spawn_count(&self) -> u32 {
        self.spawn_count
    }
}

impl Drop for ClickEmitter {
    fn drop(&mut self) {
        // The thread is not joined here; shutdown does that with a timeout.
        self.request_stop();
    }
}

/// Drift-corrected click loop.
///
/// Deadlines advance by exactly one interval from the previous deadline, so
/// sleep overshoot does not accumulate. If the loop falls a whole interval
/// behind, or the clock jumps, the deadline is resynchronised to
/// `now + interval` instead of bursting to catch up.
fn run_loop(
    shared: &EmitterShared,
    sink: &dyn ClickSink,
    clock: &dyn Clock,
    config: EmitterConfig,
    _done_tx: Sender<()>,
) {
    let interval = config.interval.min(MAX_INTERVAL);
    let poll_quantum = config.poll_quantum.min(MAX_POLL_QUANTUM);
    info!(?interval, ?poll_quantum, "Click loop started");

    let mut next_deadline = clock.now();
    let mut was_armed = false;

    while !shared.stop.load(Ordering::Acquire) {
        if !shared.armed.load(Ordering::Acquire) {
            was_armed = false;
            clock.sleep(poll_quantum);
            continue;
        }

        let now = clock.now();
        if !was_armed {
            // First click fires as soon as clicking is enabled.
            was_armed = true;
            next_deadline = now;
        } else if next_deadline > now + interval {
            debug!("clock moved backward, resynchronising deadline");
            next_deadline = now + interval;
        }

        if now >= next_deadline {
            if shared.stop.load(Ordering::Acquire) {
                break;
            }
            match sink.click() {
                Ok(()) => {
                    shared.clicks.fetch_add(1, Ordering::AcqRel);
                }
                Err(e) => warn!(error = %e, "Failed to inject click"),
            }

            next_deadline += interval;
            if next_deadline <= now {
                next_deadline = now + interval;
            }
            continue;
        }

        clock.sleep((next_deadline - now).min(poll_quantum));
    }

    info!(
        total_clicks = shared.clicks.load(Ordering::Acquire),
        "Click loop exiting"
    );
}
