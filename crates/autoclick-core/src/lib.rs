//! autoclick-core: toggle state machine + click scheduling.
//!
//! Design goal: keep this crate platform-agnostic. The OS boundary (global
//! input hook, click injection) is behind the [`InputSource`] and
//! [`ClickSink`] traits and lives in `autoclick-platform`.
//!
//! ## Module Structure
//!
//! - `rate` - click rate validation and interval derivation
//! - `binding` - toggle key/button name resolution
//! - `emitter` - the background click loop
//! - `controller` - the arm/disarm/shutdown state machine
//! - `session` - wiring input sources to the controller
//! - `settings` - config file loading
//! - `testing` - clock, sink and source doubles

mod binding;
mod clock;
mod controller;
mod emitter;
mod error;
mod input;
mod rate;
mod session;
mod settings;
pub mod testing;

pub use binding::{
    resolve_button, resolve_key, Bindings, ButtonId, KeyId, NamedKey, BINDABLE_CHARS, EXIT_KEY,
    VALID_BUTTONS,
};
pub use clock::{Clock, SystemClock};
pub use controller::{RunState, ShutdownOutcome, ToggleController, DEFAULT_SHUTDOWN_TIMEOUT};
pub use emitter::{
    ClickEmitter, EmitterConfig, EmitterHandle, JoinOutcome, DEFAULT_POLL_QUANTUM, MAX_INTERVAL,
    MAX_POLL_QUANTUM,
};
pub use error::{ClickerError, ClickerResult};
pub use input::{ClickSink, InputEvent, InputSource};
pub use rate::{RateConfig, RateDerivation, DEFAULT_RATE};
pub use session::{ExitReason, Session, SessionReport};
pub use settings::{
    default_config_path, get_config_dir, RateSetting, Settings, SettingsError, SettingsResult,
};
