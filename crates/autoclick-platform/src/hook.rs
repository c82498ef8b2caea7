//! Global input hook.
//!
//! OS input hooks are process-wide (rdev keeps one global callback), so this
//! module runs a SINGLE `rdev::listen` thread, started on first use, and fans
//! translated events out to any number of subscribers. Each subscriber gets
//! only the event kinds it asked for.

use crate::keymap::translate_event;
use crate::{PlatformError, PlatformResult};
use autoclick_core::InputEvent;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use rdev::{listen, Event};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long a first subscriber waits for `rdev::listen` to fail before
/// assuming the hook is installed. `listen` blocks for as long as it works.
const STARTUP_GRACE: Duration = Duration::from_millis(200);

/// Which events a subscriber wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    Keyboard,
    Pointer,
}

impl EventFilter {
    fn accepts(&self, event: &InputEvent) -> bool {
        match self {
            EventFilter::Keyboard => {
                matches!(event, InputEvent::KeyPress(_) | InputEvent::KeyRelease(_))
            }
            EventFilter::Pointer => matches!(
                event,
                InputEvent::ButtonPress(_) | InputEvent::ButtonRelease(_)
            ),
        }
    }
}

enum HookStatus {
    /// Listener thread spawned, not yet known to be working.
    Starting(Receiver<String>),
    Running,
    Failed(String),
}

struct Subscriber {
    id: u64,
    filter: EventFilter,
    tx: Sender<InputEvent>,
}

static GLOBAL_HOOK: OnceLock<Arc<GlobalHook>> = OnceLock::new();

struct GlobalHook {
    status: Mutex<HookStatus>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl GlobalHook {
    fn new() -> Arc<Self> {
        let (failure_tx, failure_rx) = bounded::<String>(1);
        let hook = Arc::new(Self {
            status: Mutex::new(HookStatus::Starting(failure_rx)),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        });

        let weak = Arc::downgrade(&hook);
        let spawned = thread::Builder::new()
            .name("input-hook".into())
            .spawn(move || {
                info!("Input hook thread started (rdev)");
                let callback_hook = weak.clone();
                let callback = move |event: Event| {
                    if let (Some(hook), Some(input)) =
                        (callback_hook.upgrade(), translate_event(&event.event_type))
                    {
                        hook.broadcast(input);
                    }
                };

                let reason = match listen(callback) {
                    Ok(()) => "listener returned".to_string(),
                    Err(e) => format!("{e:?}"),
                };
                error!(reason = %reason, "Input hook error");
                let _ = failure_tx.try_send(reason.clone());
                if let Some(hook) = weak.upgrade() {
                    hook.fail(reason);
                }
                info!("Input hook thread exiting");
            });

        if let Err(e) = spawned {
            hook.fail(format!("failed to spawn hook thread: {e}"));
        }
        hook
    }

    fn lock_status(&self) -> MutexGuard<'_, HookStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the hook dead and drop every subscriber sender so consumers see
    /// their channels close.
    fn fail(&self, reason: String) {
        *self.lock_status() = HookStatus::Failed(reason);
        self.lock_subscribers().clear();
    }

    /// Wait out the startup grace period once, then report health.
    fn ensure_healthy(&self) -> PlatformResult<()> {
        let pending = match &*self.lock_status() {
            HookStatus::Starting(rx) => Some(rx.clone()),
            HookStatus::Running => None,
            HookStatus::Failed(reason) => return Err(PlatformError::HookFailed(reason.clone())),
        };

        if let Some(rx) = pending {
            let next = match rx.recv_timeout(STARTUP_GRACE) {
                Ok(reason) => HookStatus::Failed(reason),
                Err(RecvTimeoutError::Timeout) => HookStatus::Running,
                Err(RecvTimeoutError::Disconnected) => {
                    HookStatus::Failed("input hook thread exited".into())
                }
            };
            let mut status = self.lock_status();
            if matches!(*status, HookStatus::Starting(_)) {
                *status = next;
            }
        }

        match &*self.lock_status() {
            HookStatus::Failed(reason) => Err(PlatformError::HookFailed(reason.clone())),
            _ => Ok(()),
        }
    }

    fn subscribe(&self, filter: EventFilter, tx: Sender<InputEvent>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock_subscribers().push(Subscriber { id, filter, tx });
        debug!(id, ?filter, "hook subscriber added");
        id
    }

    fn unsubscribe(&self, id: u64) {
        self.lock_subscribers().retain(|s| s.id != id);
        debug!(id, "hook subscriber removed");
    }

    fn broadcast(&self, event: InputEvent) {
        let mut subs = self.lock_subscribers();
        subs.retain(|sub| {
            if !sub.filter.accepts(&event) {
                return true;
            }
            match sub.tx.try_send(event) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(id = sub.id, "Failed to send input event: channel full");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        });
    }
}

/// Get or create the global hook.
fn global_hook() -> Arc<GlobalHook> {
    GLOBAL_HOOK.get_or_init(GlobalHook::new).clone()
}

/// A live subscription. Dropping it unsubscribes.
pub struct HookSubscription {
    id: u64,
    hook: Arc<GlobalHook>,
}

impl Drop for HookSubscription {
    fn drop(&mut self) {
        self.hook.unsubscribe(self.id);
    }
}

/// Subscribe to global input events of one kind.
///
/// Starts the hook on first use. Fails if the OS hook could not be
/// installed (no display, missing permissions).
pub fn subscribe(filter: EventFilter, tx: Sender<InputEvent>) -> PlatformResult<HookSubscription> {
    let hook = global_hook();
    hook.ensure_healthy()?;
    let id = hook.subscribe(filter, tx);
    Ok(HookSubscription { id, hook })
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoclick_core::{ButtonId, KeyId};

    #[test]
    fn test_filters() {
        let key = InputEvent::KeyPress(KeyId::Char('c'));
        let button = InputEvent::ButtonRelease(ButtonId::Left);

        assert!(EventFilter::Keyboard.accepts(&key));
        assert!(!EventFilter::Keyboard.accepts(&button));
        assert!(EventFilter::Pointer.accepts(&button));
        assert!(!EventFilter::Pointer.accepts(&key));
    }

    /// A hook built by hand, without the rdev thread.
    fn detached_hook() -> GlobalHook {
        GlobalHook {
            status: Mutex::new(HookStatus::Running),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    #[test]
    fn test_broadcast_respects_filters_and_prunes() {
        let hook = detached_hook();
        let (kb_tx, kb_rx) = bounded(8);
        let (ptr_tx, ptr_rx) = bounded(8);
        hook.subscribe(EventFilter::Keyboard, kb_tx);
        let ptr_id = hook.subscribe(EventFilter::Pointer, ptr_tx);

        hook.broadcast(InputEvent::KeyPress(KeyId::Char('c')));
        hook.broadcast(InputEvent::ButtonPress(ButtonId::Right));

        assert_eq!(kb_rx.try_recv().ok(), Some(InputEvent::KeyPress(KeyId::Char('c'))));
        assert!(kb_rx.try_recv().is_err());
        assert_eq!(ptr_rx.try_recv().ok(), Some(InputEvent::ButtonPress(ButtonId::Right)));

        drop(kb_rx);
        hook.broadcast(InputEvent::KeyPress(KeyId::Char('c')));
        assert_eq!(hook.lock_subscribers().len(), 1);

        hook.unsubscribe(ptr_id);
        assert!(hook.lock_subscribers().is_empty());
    }

    #[test]
    fn test_failure_closes_subscribers() {
        let hook = detached_hook();
        let (tx, rx) = bounded(8);
        hook.subscribe(EventFilter::Keyboard, tx);

        hook.fail("no display".into());
        assert!(rx.recv().is_err());
        assert!(matches!(
            hook.ensure_healthy(),
            Err(PlatformError::HookFailed(reason)) if reason == "no display"
        ));
    }

    #[test]
    fn test_startup_failure_is_reported() {
        let (failure_tx, failure_rx) = bounded(1);
        let hook = GlobalHook {
            status: Mutex::new(HookStatus::Starting(failure_rx)),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        };
        failure_tx.send("XOpenDisplay failed".to_string()).unwrap();
        assert!(hook.ensure_healthy().is_err());
    }

    #[test]
    fn test_quiet_startup_means_running() {
        let (_failure_tx, failure_rx) = bounded::<String>(1);
        let hook = GlobalHook {
            status: Mutex::new(HookStatus::Starting(failure_rx)),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        };
        assert!(hook.ensure_healthy().is_ok());
        assert!(matches!(*hook.lock_status(), HookStatus::Running));
    }
}
