//! Translation of rdev events into core identifiers.
//!
//! Character keys map by physical key, not by the produced character, so a
//! `c` binding fires for C with or without Shift.

use autoclick_core::{ButtonId, InputEvent, KeyId, NamedKey};
use rdev::EventType;

/// Translate an rdev event. Mouse moves, wheel events and unknown keys or
/// buttons yield `None`.
pub fn translate_event(event_type: &EventType) -> Option<InputEvent> {
    match *event_type {
        EventType::KeyPress(key) => key_id(key).map(InputEvent::KeyPress),
        EventType::KeyRelease(key) => key_id(key).map(InputEvent::KeyRelease),
        EventType::ButtonPress(button) => button_id(button).map(InputEvent::ButtonPress),
        EventType::ButtonRelease(button) => button_id(button).map(InputEvent::ButtonRelease),
        EventType::MouseMove { .. } | EventType::Wheel { .. } => None,
    }
}

pub fn button_id(button: rdev::Button) -> Option<ButtonId> {
    match button {
        rdev::Button::Left => Some(ButtonId::Left),
        rdev::Button::Right => Some(ButtonId::Right),
        rdev::Button::Middle => Some(ButtonId::Middle),
        rdev::Button::Unknown(_) => None,
    }
}

/// Map an rdev key to a [`KeyId`].
pub fn key_id(key: rdev::Key) -> Option<KeyId> {
    use rdev::Key;

    let named = |k| Some(KeyId::Named(k));
    let ch = |c| Some(KeyId::Char(c));

    match key {
        Key::Alt => named(NamedKey::Alt),
        Key::AltGr => named(NamedKey::AltGr),
        Key::Backspace => named(NamedKey::Backspace),
        Key::CapsLock => named(NamedKey::CapsLock),
        Key::ControlLeft => named(NamedKey::Control),
        Key::ControlRight => named(NamedKey::ControlRight),
        Key::Delete | Key::KpDelete => named(NamedKey::Delete),
        Key::DownArrow => named(NamedKey::Down),
        Key::End => named(NamedKey::End),
        Key::Escape => named(NamedKey::Escape),
        Key::F1 => named(NamedKey::F1),
        Key::F2 => named(NamedKey::F2),
        Key::F3 => named(NamedKey::F3),
        Key::F4 => named(NamedKey::F4),
        Key::F5 => named(NamedKey::F5),
        Key::F6 => named(NamedKey::F6),
        Key::F7 => named(NamedKey::F7),
        Key::F8 => named(NamedKey::F8),
        Key::F9 => named(NamedKey::F9),
        Key::F10 => named(NamedKey::F10),
        Key::F11 => named(NamedKey::F11),
        Key::F12 => named(NamedKey::F12),
        Key::Home => named(NamedKey::Home),
        Key::LeftArrow => named(NamedKey::Left),
        Key::MetaLeft => named(NamedKey::Meta),
        Key::MetaRight => named(NamedKey::MetaRight),
        Key::PageDown => named(NamedKey::PageDown),
        Key::PageUp => named(NamedKey::PageUp),
        Key::Return | Key::KpReturn => named(NamedKey::Enter),
        Key::RightArrow => named(NamedKey::Right),
        Key::ShiftLeft => named(NamedKey::Shift),
        Key::ShiftRight => named(NamedKey::ShiftRight),
        Key::Space => named(NamedKey::Space),
        Key::Tab => named(NamedKey::Tab),
        Key::UpArrow => named(NamedKey::Up),
        Key::PrintScreen => named(NamedKey::PrintScreen),
        Key::ScrollLock => named(NamedKey::ScrollLock),
        Key::Pause => named(NamedKey::Pause),
        Key::NumLock => named(NamedKey::NumLock),
        Key::Insert => named(NamedKey::Insert),
        Key::Function => named(NamedKey::Function),
        Key::BackQuote => ch('`'),
        Key::Num1 | Key::Kp1 => ch('1'),
        Key::Num2 | Key::Kp2 => ch('2'),
        Key::Num3 | Key::Kp3 => ch('3'),
        Key::Num4 | Key::Kp4 => ch('4'),
        Key::Num5 | Key::Kp5 => ch('5'),
        Key::Num6 | Key::Kp6 => ch('6'),
        Key::Num7 | Key::Kp7 => ch('7'),
        Key::Num8 | Key::Kp8 => ch('8'),
        Key::Num9 | Key::Kp9 => ch('9'),
        Key::Num0 | Key::Kp0 => ch('0'),
        Key::Minus | Key::KpMinus => ch('-'),
        Key::Equal => ch('='),
        Key::KpPlus => ch('+'),
        Key::KpMultiply => ch('*'),
        Key::KpDivide => ch('/'),
        Key::KeyQ => ch('q'),
        Key::KeyW => ch('w'),
        Key::KeyE => ch('e'),
        Key::KeyR => ch('r'),
        Key::KeyT => ch('t'),
        Key::KeyY => ch('y'),
        Key::KeyU => ch('u'),
        Key::KeyI => ch('i'),
        Key::KeyO => ch('o'),
        Key::KeyP => ch('p'),
        Key::LeftBracket => ch('['),
        Key::RightBracket => ch(']'),
        Key::KeyA => ch('a'),
        Key::KeyS => ch('s'),
        Key::KeyD => ch('d'),
        Key::KeyF => ch('f'),
        Key::KeyG => ch('g'),
        Key::KeyH => ch('h'),
        Key::KeyJ => ch('j'),
        Key::KeyK => ch('k'),
        Key::KeyL => ch('l'),
        Key::SemiColon => ch(';'),
        Key::Quote => ch('\''),
        Key::BackSlash | Key::IntlBackslash => ch('\\'),
        Key::KeyZ => ch('z'),
        Key::KeyX => ch('x'),
        Key::KeyC => ch('c'),
        Key::KeyV => ch('v'),
        Key::KeyB => ch('b'),
        Key::KeyN => ch('n'),
        Key::KeyM => ch('m'),
        Key::Comma => ch(','),
        Key::Dot => ch('.'),
        Key::Slash => ch('/'),
        Key::Unknown(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoclick_core::{resolve_key, BINDABLE_CHARS, EXIT_KEY};
    use rdev::Key;
    use std::collections::BTreeSet;

    #[test]
    fn test_letter_keys_match_char_bindings() {
        assert_eq!(key_id(rdev::Key::KeyC), Some(resolve_key("c").unwrap()));
        assert_eq!(key_id(rdev::Key::KeyC), Some(resolve_key("C").unwrap()));
        assert_eq!(key_id(rdev::Key::Num5), Some(resolve_key("5").unwrap()));
    }

    /// Every key that produces a character in `key_id`.
    const CHAR_KEYS: [Key; 62] = [
        Key::BackQuote,
        Key::Num1,
        Key::Num2,
        Key::Num3,
        Key::Num4,
        Key::Num5,
        Key::Num6,
        Key::Num7,
        Key::Num8,
        Key::Num9,
        Key::Num0,
        Key::Kp1,
        Key::Kp2,
        Key::Kp3,
        Key::Kp4,
        Key::Kp5,
        Key::Kp6,
        Key::Kp7,
        Key::Kp8,
        Key::Kp9,
        Key::Kp0,
        Key::Minus,
        Key::KpMinus,
        Key::Equal,
        Key::KpPlus,
        Key::KpMultiply,
        Key::KpDivide,
        Key::KeyQ,
        Key::KeyW,
        Key::KeyE,
        Key::KeyR,
        Key::KeyT,
        Key::KeyY,
        Key::KeyU,
        Key::KeyI,
        Key::KeyO,
        Key::KeyP,
        Key::LeftBracket,
        Key::RightBracket,
        Key::KeyA,
        Key::KeyS,
        Key::KeyD,
        Key::KeyF,
        Key::KeyG,
        Key::KeyH,
        Key::KeyJ,
        Key::KeyK,
        Key::KeyL,
        Key::SemiColon,
        Key::Quote,
        Key::BackSlash,
        Key::IntlBackslash,
        Key::KeyZ,
        Key::KeyX,
        Key::KeyC,
        Key::KeyV,
        Key::KeyB,
        Key::KeyN,
        Key::KeyM,
        Key::Comma,
        Key::Dot,
        Key::Slash,
    ];

    #[test]
    fn test_bindable_chars_match_physical_keys() {
        let produced: BTreeSet<char> = CHAR_KEYS
            .iter()
            .map(|&key| match key_id(key) {
                Some(KeyId::Char(c)) => c,
                other => panic!("{key:?} produced {other:?}"),
            })
            .collect();
        let bindable: BTreeSet<char> = BINDABLE_CHARS.chars().collect();
        assert_eq!(produced, bindable);

        // Each bindable character is matched by the key that produces it.
        for &key in &CHAR_KEYS {
            let Some(KeyId::Char(c)) = key_id(key) else {
                unreachable!()
            };
            assert_eq!(resolve_key(&c.to_string()).unwrap(), KeyId::Char(c));
        }
    }

    #[test]
    fn test_named_keys_match_bindings() {
        assert_eq!(key_id(rdev::Key::Escape), Some(EXIT_KEY));
        assert_eq!(key_id(rdev::Key::Space), Some(resolve_key("space").unwrap()));
        assert_eq!(key_id(rdev::Key::F6), Some(resolve_key("f6").unwrap()));
        assert_eq!(key_id(rdev::Key::ShiftLeft), Some(resolve_key("shift").unwrap()));
        assert_eq!(key_id(rdev::Key::Unknown(999)), None);
    }

    #[test]
    fn test_modifiers_never_match_chars() {
        for key in [rdev::Key::ShiftLeft, rdev::Key::ControlLeft, rdev::Key::Alt] {
            let id = key_id(key).unwrap();
            assert!(id.is_modifier());
            assert_ne!(id, KeyId::Char('c'));
        }
    }

    #[test]
    fn test_translate_event() {
        assert_eq!(
            translate_event(&EventType::ButtonPress(rdev::Button::Right)),
            Some(InputEvent::ButtonPress(ButtonId::Right))
        );
        assert_eq!(
            translate_event(&EventType::KeyRelease(rdev::Key::KeyC)),
            Some(InputEvent::KeyRelease(KeyId::Char('c')))
        );
        assert_eq!(translate_event(&EventType::MouseMove { x: 1.0, y: 2.0 }), None);
        assert_eq!(
            translate_event(&EventType::ButtonPress(rdev::Button::Unknown(4))),
            None
        );
    }
}
