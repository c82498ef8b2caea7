//! Toggle bindings: configured key/button names resolved to identifiers.
//!
//! Names are resolved once at configuration time. Input sources translate
//! raw OS events into the same [`KeyId`] / [`ButtonId`] values, so matching an
//! event is a plain equality check.

use crate::{ClickerError, ClickerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// The fixed, non-configurable exit key.
pub const EXIT_KEY: KeyId = KeyId::Named(NamedKey::Escape);

/// Pointer buttons accepted as toggle sources.
pub const VALID_BUTTONS: [&str; 3] = ["left", "right", "middle"];

/// Characters a toggle key may be bound to. Key events identify the
/// physical key, so these are the unshifted characters of the US layout
/// plus the keypad operators. Shifted symbols such as `!` never arrive.
pub const BINDABLE_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789`-=[]\\;',./+*";

/// A key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyId {
    /// A character-producing key, stored lowercase so Shift does not matter.
    Char(char),
    /// A symbolic key that produces no character.
    Named(NamedKey),
}

/// Symbolic keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Escape,
    Space,
    Tab,
    Enter,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    CapsLock,
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,
    Shift,
    ShiftRight,
    Control,
    ControlRight,
    Alt,
    AltGr,
    Meta,
    MetaRight,
    Function,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

impl NamedKey {
    /// Whether pressing this key only modifies other keys.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            NamedKey::Shift
                | NamedKey::ShiftRight
                | NamedKey::Control
                | NamedKey::ControlRight
                | NamedKey::Alt
                | NamedKey::AltGr
                | NamedKey::Meta
                | NamedKey::MetaRight
                | NamedKey::Function
        )
    }

    /// Look up a symbolic name. `name` must already be lowercase with
    /// separators removed.
    fn from_normalized(name: &str) -> Option<Self> {
        let key = match name {
            "esc" | "escape" => NamedKey::Escape,
            "space" | "spacebar" => NamedKey::Space,
            "tab" => NamedKey::Tab,
            "enter" | "return" => NamedKey::Enter,
            "backspace" | "back" => NamedKey::Backspace,
            "delete" | "del" => NamedKey::Delete,
            "insert" | "ins" => NamedKey::Insert,
            "home" => NamedKey::Home,
            "end" => NamedKey::End,
            "pageup" | "pgup" => NamedKey::PageUp,
            "pagedown" | "pgdn" => NamedKey::PageDown,
            "up" | "uparrow" => NamedKey::Up,
            "down" | "downarrow" => NamedKey::Down,
            "left" | "leftarrow" => NamedKey::Left,
            "right" | "rightarrow" => NamedKey::Right,
            "capslock" | "caps" => NamedKey::CapsLock,
            "numlock" => NamedKey::NumLock,
            "scrolllock" => NamedKey::ScrollLock,
            "printscreen" | "prtsc" => NamedKey::PrintScreen,
            "pause" => NamedKey::Pause,
            "shift" | "lshift" | "shiftl" => NamedKey::Shift,
            "rshift" | "shiftr" => NamedKey::ShiftRight,
            "ctrl" | "control" | "lctrl" | "ctrll" => NamedKey::Control,
            "rctrl" | "ctrlr" => NamedKey::ControlRight,
            "alt" | "lalt" | "altl" => NamedKey::Alt,
            "altgr" | "ralt" | "altr" => NamedKey::AltGr,
            "meta" | "cmd" | "super" | "win" | "cmdl" => NamedKey::Meta,
            "rmeta" | "cmdr" => NamedKey::MetaRight,
            "fn" | "function" => NamedKey::Function,
            "f1" => NamedKey::F1,
            "f2" => NamedKey::F2,
            "f3" => NamedKey::F3,
            "f4" => NamedKey::F4,
            "f5" => NamedKey::F5,
            "f6" => NamedKey::F6,
            "f7" => NamedKey::F7,
            "f8" => NamedKey::F8,
            "f9" => NamedKey::F9,
            "f10" => NamedKey::F10,
            "f11" => NamedKey::F11,
            "f12" => NamedKey::F12,
            _ => return None,
        };
        Some(key)
    }
}

impl KeyId {
    /// Build a character key, normalising case.
    pub fn char(c: char) -> Self {
        KeyId::Char(c.to_lowercase().next().unwrap_or(c))
    }

    pub fn is_modifier(&self) -> bool {
        match self {
            KeyId::Char(_) => false,
            KeyId::Named(named) => named.is_modifier(),
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Char(c) => write!(f, "{}", c.to_uppercase()),
            KeyId::Named(named) => write!(f, "{named:?}"),
        }
    }
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonId {
    Left,
    Right,
    Middle,
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ButtonId::Left => "LEFT",
            ButtonId::Right => "RIGHT",
            ButtonId::Middle => "MIDDLE",
        };
        f.write_str(name)
    }
}

/// Resolve a toggle key name.
///
/// A single character is a literal character key (`"c"` toggles on the C
/// key whatever the modifier state) and must be one of [`BINDABLE_CHARS`].
/// Anything longer is a case-insensitive symbolic name; `_`, `-` and spaces
/// are ignored so `page_down`, `Page-Down` and `pagedown` are the same key.
pub fn resolve_key(name: &str) -> ClickerResult<KeyId> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c == ' ' {
            return Ok(KeyId::Named(NamedKey::Space));
        }
        let key = KeyId::char(c);
        return match key {
            KeyId::Char(lower) if BINDABLE_CHARS.contains(lower) => Ok(key),
            _ => Err(ClickerError::UnknownKeyBinding(name.to_string())),
        };
    }

    let normalized: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect();

    NamedKey::from_normalized(&normalized)
        .map(KeyId::Named)
        .ok_or_else(|| ClickerError::UnknownKeyBinding(name.to_string()))
}

/// Resolve a pointer button name (`left`, `right` or `middle`, any case).
pub fn resolve_button(name: &str) -> ClickerResult<ButtonId> {
    match name.trim().to_lowercase().as_str() {
        "left" => Ok(ButtonId::Left),
        "right" => Ok(ButtonId::Right),
        "middle" => Ok(ButtonId::Middle),
        _ => Err(ClickerError::UnknownButtonBinding(name.to_string())),
    }
}

/// The resolved toggle sources for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bindings {
    pub toggle_key: Option<KeyId>,
    pub toggle_button: Option<ButtonId>,
}

impl Bindings {
    /// Resolve the configured names.
    ///
    /// An unknown key is fatal since it leaves no way to engage clicking.
    /// An unknown button only disables button toggling.
    pub fn resolve(toggle_key: Option<&str>, toggle_button: Option<&str>) -> ClickerResult<Self> {
        let toggle_key = toggle_key.map(resolve_key).transpose()?;

        let toggle_button = match toggle_button.map(resolve_button).transpose() {
            Ok(button) => button,
            Err(err) => {
                warn!("{err}; mouse toggling disabled");
                None
            }
        };

        let bindings = Self {
            toggle_key,
            toggle_button,
        };
        bindings.warn_on_degraded();
        Ok(bindings)
    }

    fn warn_on_degraded(&self) {
        if self.toggle_key.is_none() && self.toggle_button.is_none() {
            warn!("no toggle key or mouse button configured; clicking can never be enabled");
        }
        if self.toggle_key == Some(EXIT_KEY) {
            warn!("toggle key is the exit key; pressing it will exit instead of toggling");
        }
        if self.toggle_button == Some(ButtonId::Left) {
            warn!("toggle button is LEFT; injected clicks will toggle clicking off again");
        }
    }

    /// Human readable summary for the startup banner.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(key) = self.toggle_key {
            parts.push(format!("Press '{key}' to toggle clicking"));
        }
        if let Some(button) = self.toggle_button {
            if parts.is_empty() {
                parts.push(format!("Use mouse {button} to toggle clicking"));
            } else {
                parts.push(format!("or use mouse {button}"));
            }
        }
        if parts.is_empty() {
            parts.push("No toggle configured".to_string());
        }
        format!("{}. Press ESC to exit.", parts.join(" "))
    }
}
