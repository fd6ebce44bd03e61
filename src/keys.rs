// src/keys.rs

//! Key symbols and modifier flags.
//!
//! The engine reports non-printable keys (arrows, function keys, mouse
//! buttons, the resize/invalid sentinels) as codepoints inside Unicode's
//! supplementary private use area B. `KeySymbol` enumerates them with the
//! raw code as discriminant, which gives exhaustiveness checking where a
//! runtime dictionary would not. The name and code mappings are
//! bidirectional, built once, and read-only afterward.

use bitflags::bitflags;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// First codepoint of the engine's key plane (supplementary private use
/// area B).
pub const KEY_BASE: u32 = 0x10_0000;

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL  = 1 << 1;
        const ALT   = 1 << 2;
    }
}

/// A non-printable key as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum KeySymbol {
    Invalid = KEY_BASE,
    Resize = KEY_BASE + 1,
    Up = KEY_BASE + 2,
    Right = KEY_BASE + 3,
    Down = KEY_BASE + 4,
    Left = KEY_BASE + 5,
    Insert = KEY_BASE + 6,
    Delete = KEY_BASE + 7,
    Backspace = KEY_BASE + 8,
    PageDown = KEY_BASE + 9,
    PageUp = KEY_BASE + 10,
    Home = KEY_BASE + 11,
    End = KEY_BASE + 12,
    F0 = KEY_BASE + 20,
    F1 = KEY_BASE + 21,
    F2 = KEY_BASE + 22,
    F3 = KEY_BASE + 23,
    F4 = KEY_BASE + 24,
    F5 = KEY_BASE + 25,
    F6 = KEY_BASE + 26,
    F7 = KEY_BASE + 27,
    F8 = KEY_BASE + 28,
    F9 = KEY_BASE + 29,
    F10 = KEY_BASE + 30,
    F11 = KEY_BASE + 31,
    F12 = KEY_BASE + 32,
    Enter = KEY_BASE + 121,
    /// The engine's "clear screen" key.
    Clear = KEY_BASE + 122,
    DownLeft = KEY_BASE + 123,
    DownRight = KEY_BASE + 124,
    UpLeft = KEY_BASE + 125,
    UpRight = KEY_BASE + 126,
    Center = KEY_BASE + 127,
    Begin = KEY_BASE + 128,
    Cancel = KEY_BASE + 129,
    Close = KEY_BASE + 130,
    Command = KEY_BASE + 131,
    Copy = KEY_BASE + 132,
    Exit = KEY_BASE + 133,
    Print = KEY_BASE + 134,
    Refresh = KEY_BASE + 135,
    MouseLeftButton = KEY_BASE + 201,
    MouseMiddleButton = KEY_BASE + 202,
    MouseRightButton = KEY_BASE + 203,
    MouseScrollUp = KEY_BASE + 204,
    MouseScrollDown = KEY_BASE + 205,
    MouseButton6 = KEY_BASE + 206,
    MouseRelease = KEY_BASE + 212,
}

impl KeySymbol {
    /// Every symbol the engine can report, in code order.
    pub const ALL: &'static [KeySymbol] = &[
        KeySymbol::Invalid,
        KeySymbol::Resize,
        KeySymbol::Up,
        KeySymbol::Right,
        KeySymbol::Down,
        KeySymbol::Left,
        KeySymbol::Insert,
        KeySymbol::Delete,
        KeySymbol::Backspace,
        KeySymbol::PageDown,
        KeySymbol::PageUp,
        KeySymbol::Home,
        KeySymbol::End,
        KeySymbol::F0,
        KeySymbol::F1,
        KeySymbol::F2,
        KeySymbol::F3,
        KeySymbol::F4,
        KeySymbol::F5,
        KeySymbol::F6,
        KeySymbol::F7,
        KeySymbol::F8,
        KeySymbol::F9,
        KeySymbol::F10,
        KeySymbol::F11,
        KeySymbol::F12,
        KeySymbol::Enter,
        KeySymbol::Clear,
        KeySymbol::DownLeft,
        KeySymbol::DownRight,
        KeySymbol::UpLeft,
        KeySymbol::UpRight,
        KeySymbol::Center,
        KeySymbol::Begin,
        KeySymbol::Cancel,
        KeySymbol::Close,
        KeySymbol::Command,
        KeySymbol::Copy,
        KeySymbol::Exit,
        KeySymbol::Print,
        KeySymbol::Refresh,
        KeySymbol::MouseLeftButton,
        KeySymbol::MouseMiddleButton,
        KeySymbol::MouseRightButton,
        KeySymbol::MouseScrollUp,
        KeySymbol::MouseScrollDown,
        KeySymbol::MouseButton6,
        KeySymbol::MouseRelease,
    ];

    /// The engine's raw codepoint for this symbol.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// The stable lowercase name for this symbol.
    pub const fn name(self) -> &'static str {
        match self {
            KeySymbol::Invalid => "invalid",
            KeySymbol::Resize => "resize",
            KeySymbol::Up => "up",
            KeySymbol::Right => "right",
            KeySymbol::Down => "down",
            KeySymbol::Left => "left",
            KeySymbol::Insert => "insert",
            KeySymbol::Delete => "delete",
            KeySymbol::Backspace => "backspace",
            KeySymbol::PageDown => "page_down",
            KeySymbol::PageUp => "page_up",
            KeySymbol::Home => "home",
            KeySymbol::End => "end",
            KeySymbol::F0 => "f0",
            KeySymbol::F1 => "f1",
            KeySymbol::F2 => "f2",
            KeySymbol::F3 => "f3",
            KeySymbol::F4 => "f4",
            KeySymbol::F5 => "f5",
            KeySymbol::F6 => "f6",
            KeySymbol::F7 => "f7",
            KeySymbol::F8 => "f8",
            KeySymbol::F9 => "f9",
            KeySymbol::F10 => "f10",
            KeySymbol::F11 => "f11",
            KeySymbol::F12 => "f12",
            KeySymbol::Enter => "enter",
            KeySymbol::Clear => "clear",
            KeySymbol::DownLeft => "down_left",
            KeySymbol::DownRight => "down_right",
            KeySymbol::UpLeft => "up_left",
            KeySymbol::UpRight => "up_right",
            KeySymbol::Center => "center",
            KeySymbol::Begin => "begin",
            KeySymbol::Cancel => "cancel",
            KeySymbol::Close => "close",
            KeySymbol::Command => "command",
            KeySymbol::Copy => "copy",
            KeySymbol::Exit => "exit",
            KeySymbol::Print => "print",
            KeySymbol::Refresh => "refresh",
            KeySymbol::MouseLeftButton => "mouse_left_button",
            KeySymbol::MouseMiddleButton => "mouse_middle_button",
            KeySymbol::MouseRightButton => "mouse_right_button",
            KeySymbol::MouseScrollUp => "mouse_scroll_up",
            KeySymbol::MouseScrollDown => "mouse_scroll_down",
            KeySymbol::MouseButton6 => "mouse_button6",
            KeySymbol::MouseRelease => "mouse_release",
        }
    }

    /// Looks up a symbol by the engine's raw codepoint.
    pub fn from_code(code: u32) -> Option<KeySymbol> {
        CODE_TO_SYMBOL.get(&code).copied()
    }

    /// Looks up a symbol by its stable name.
    pub fn from_name(name: &str) -> Option<KeySymbol> {
        NAME_TO_SYMBOL.get(name).copied()
    }

    /// Returns true for mouse buttons, wheel, and release events.
    pub fn is_mouse(self) -> bool {
        matches!(
            self,
            KeySymbol::MouseLeftButton
                | KeySymbol::MouseMiddleButton
                | KeySymbol::MouseRightButton
                | KeySymbol::MouseScrollUp
                | KeySymbol::MouseScrollDown
                | KeySymbol::MouseButton6
                | KeySymbol::MouseRelease
        )
    }
}

static CODE_TO_SYMBOL: Lazy<HashMap<u32, KeySymbol>> =
    Lazy::new(|| KeySymbol::ALL.iter().map(|&k| (k.code(), k)).collect());

static NAME_TO_SYMBOL: Lazy<HashMap<&'static str, KeySymbol>> =
    Lazy::new(|| KeySymbol::ALL.iter().map(|&k| (k.name(), k)).collect());

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_round_trip() {
        for &sym in KeySymbol::ALL {
            assert_eq!(KeySymbol::from_code(sym.code()), Some(sym));
        }
    }

    #[test]
    fn names_round_trip() {
        for &sym in KeySymbol::ALL {
            assert_eq!(KeySymbol::from_name(sym.name()), Some(sym), "{}", sym.name());
        }
    }

    #[test]
    fn names_and_codes_are_unique() {
        let names: HashSet<_> = KeySymbol::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), KeySymbol::ALL.len());
        let codes: HashSet<_> = KeySymbol::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), KeySymbol::ALL.len());
    }

    #[test]
    fn known_codes_match_the_engine_layout() {
        assert_eq!(KeySymbol::Invalid.code(), KEY_BASE);
        assert_eq!(KeySymbol::Up.code(), KEY_BASE + 2);
        assert_eq!(KeySymbol::F5.code(), KEY_BASE + 25);
        assert_eq!(KeySymbol::Enter.code(), KEY_BASE + 121);
        assert_eq!(KeySymbol::MouseLeftButton.code(), KEY_BASE + 201);
        assert_eq!(KeySymbol::MouseRelease.code(), KEY_BASE + 212);
    }

    #[test]
    fn printable_codepoints_are_not_symbols() {
        assert_eq!(KeySymbol::from_code('q' as u32), None);
        assert_eq!(KeySymbol::from_code('\u{00e9}' as u32), None);
    }

    #[test]
    fn mouse_predicate() {
        assert!(KeySymbol::MouseScrollUp.is_mouse());
        assert!(!KeySymbol::Enter.is_mouse());
    }
}
