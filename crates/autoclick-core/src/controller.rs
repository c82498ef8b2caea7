//! Toggle controller: the run state machine.
//!
//! All transitions go through one mutex. The click loop never takes it, so
//! `shutdown()` can block on the loop from the event-dispatch context without
//! deadlocking.

use crate::binding::EXIT_KEY;
use crate::emitter::JoinOutcome;
use crate::{Bindings, ButtonId, ClickEmitter, ClickerError, KeyId};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long `shutdown()` waits for the click loop by default.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Controller state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    /// Not clicking. The click loop may be alive and idle-polling.
    #[default]
    Idle,
    /// Clicking.
    Armed,
    /// Shutdown requested, waiting for the click loop.
    ShuttingDown,
    /// Terminal.
    Stopped,
}

/// What a `shutdown()` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The click loop exited (or was never started).
    Completed,
    /// The click loop did not exit in time and was left detached.
    TimedOut,
    /// Shutdown had already begun; nothing was done.
    AlreadyShutDown,
}

struct ControllerInner {
    state: RunState,
    emitter: ClickEmitter,
}

/// Owns the run state and the click emitter for one session.
pub struct ToggleController {
    bindings: Bindings,
    shutdown_timeout: Duration,
    inner: Mutex<ControllerInner>,
}

impl ToggleController {
    pub fn new(bindings: Bindings, emitter: ClickEmitter) -> Self {
        Self {
            bindings,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            inner: Mutex::new(ControllerInner {
                state: RunState::Idle,
                emitter,
            }),
        }
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn state(&self) -> RunState {
        self.lock().state
    }

    pub fn is_armed(&self) -> bool {
        self.lock().emitter.is_armed()
    }

    pub fn click_count(&self) -> u64 {
        self.lock().emitter.click_count()
    }

    /// Number of click loop threads spawned so far.
    pub fn spawn_count(&self) -> u32 {
        self.lock().emitter.spawn_count()
    }

    pub fn emitter_alive(&self) -> bool {
        self.lock().emitter.is_alive()
    }

    /// Flip between `Idle` and `Armed`. No-op once shutdown has begun.
    ///
    /// Returns the state after the call.
    pub fn toggle(&self) -> RunState {
        let mut inner = self.lock();
        let state = inner.state;
        match state {
            RunState::Idle => {
                inner.emitter.set_armed(true);
                match inner.emitter.ensure_running() {
                    Ok(spawned) => {
                        debug!(spawned, "click loop ready");
                        transition(&mut inner, RunState::Armed);
                        info!("Mouse clicking started");
                    }
                    Err(e) => {
                        inner.emitter.set_armed(false);
                        error!(error = %e, "could not start clicking");
                    }
                }
            }
            RunState::Armed => {
                inner.emitter.set_armed(false);
                transition(&mut inner, RunState::Idle);
                info!("Mouse clicking stopped");
            }
            RunState::ShuttingDown | RunState::Stopped => {
                debug!(?state, "toggle ignored after shutdown");
            }
        }
        inner.state
    }

    /// Stop clicking, stop the loop and wait for it, bounded by the shutdown
    /// timeout. Idempotent.
    pub fn shutdown(&self) -> ShutdownOutcome {
        let handle = {
            let mut inner = self.lock();
            if matches!(inner.state, RunState::ShuttingDown | RunState::Stopped) {
                debug!(state = ?inner.state, "shutdown already in progress");
                return ShutdownOutcome::AlreadyShutDown;
            }
            transition(&mut inner, RunState::ShuttingDown);
            inner.emitter.request_stop();
            inner.emitter.take_handle()
        };

        // Join without holding the lock so state queries stay responsive.
        let outcome = match handle.map(|h| h.join_timeout(self.shutdown_timeout)) {
            None | Some(JoinOutcome::Joined) => ShutdownOutcome::Completed,
            Some(JoinOutcome::TimedOut) => {
                warn!("{}", ClickerError::EmitterJoinTimeout(self.shutdown_timeout));
                ShutdownOutcome::TimedOut
            }
        };

        let mut inner = self.lock();
        transition(&mut inner, RunState::Stopped);
        info!(
            total_clicks = inner.emitter.click_count(),
            ?outcome,
            "Auto clicker stopped"
        );
        outcome
    }

    /// Key press from the keyboard source. Returns true if `key` is the
    /// toggle key.
    pub fn on_key_event(&self, key: KeyId) -> bool {
        if self.bindings.toggle_key != Some(key) {
            return false;
        }
        self.toggle();
        true
    }

    /// Pointer button event. Only presses of the toggle button toggle, and
    /// only those return true.
    pub fn on_button_event(&self, button: ButtonId, pressed: bool) -> bool {
        if !pressed || self.bindings.toggle_button != Some(button) {
            return false;
        }
        self.toggle();
        true
    }

    /// Shut down if `key` is the exit key. `Some` tells the caller to stop
    /// listening.
    pub fn on_exit_key(&self, key: KeyId) -> Option<ShutdownOutcome> {
        if key != EXIT_KEY {
            return None;
        }
        info!("Stopping auto clicker");
        Some(self.shutdown())
    }
}

fn transition(inner: &mut ControllerInner, new: RunState) {
    let old = inner.state;
    if old != new {
        inner.state = new;
        debug!(?old, ?new, "state transition");
    }
}
