//! Seams to the OS: where input events come from and where clicks go.
//!
//! Implemented by `autoclick-platform` (rdev hook, enigo injection) and by
//! the fakes in [`crate::testing`].

use crate::{ButtonId, ClickerResult, KeyId};
use crossbeam_channel::Sender;

/// An input event delivered to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPress(KeyId),
    KeyRelease(KeyId),
    ButtonPress(ButtonId),
    ButtonRelease(ButtonId),
}

/// A listener that publishes input events until stopped.
pub trait InputSource: Send {
    /// Name used in logs and errors, e.g. "keyboard".
    fn name(&self) -> &str;

    /// Start publishing into `events`.
    ///
    /// Fails with `ClickerError::ListenerStartFailure` when the OS listener
    /// cannot be installed.
    fn start(&mut self, events: Sender<InputEvent>) -> ClickerResult<()>;

    /// Stop publishing. Must be safe to call more than once and on a source
    /// that never started.
    fn stop(&mut self);
}

/// Issues one primary-button press-and-release at the current pointer
/// position.
pub trait ClickSink: Send + Sync {
    fn click(&self) -> Result<(), String>;
}
