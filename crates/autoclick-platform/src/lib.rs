//! autoclick-platform: platform-specific I/O boundary for autoclick.
//!
//! This crate provides:
//! - Click injection via `enigo`
//! - A global input hook via `rdev`, shared by all listeners in the process
//! - `InputSource` implementations for keyboard and pointer events
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `clicker` - `ClickSink` implementations
//! - `keymap` - rdev key/button translation
//! - `hook` - the process-wide rdev listener
//! - `sources` - keyboard and pointer `InputSource`s

mod clicker;
mod error;
mod hook;
mod keymap;
mod sources;

// Re-export error types
pub use error::{PlatformError, PlatformResult};

// Re-export click injection
pub use clicker::{EnigoClicker, NoopClicker};

// Re-export input listening
pub use hook::{subscribe, EventFilter, HookSubscription};
pub use keymap::{button_id, key_id, translate_event};
pub use sources::RdevSource;
