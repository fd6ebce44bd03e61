// src/input.rs

//! Decoded input events.

use crate::engine::RawInput;
use crate::keys::{KeySymbol, Modifiers};

/// What a single input event carried: a known non-printable symbol, or a
/// plain character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCode {
    Key(KeySymbol),
    Char(char),
}

impl EventCode {
    pub fn as_key(self) -> Option<KeySymbol> {
        match self {
            EventCode::Key(sym) => Some(sym),
            EventCode::Char(_) => None,
        }
    }

    pub fn as_char(self) -> Option<char> {
        match self {
            EventCode::Char(c) => Some(c),
            EventCode::Key(_) => None,
        }
    }
}

/// One decoded keyboard/mouse event.
///
/// Immutable value produced per blocking-input call. `seqnum` is a
/// monotonically increasing counter supplied by the engine; callers can use
/// it to detect dropped or duplicated events, this layer does not enforce
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub code: EventCode,
    pub row: i32,
    pub col: i32,
    pub modifiers: Modifiers,
    pub seqnum: u64,
}

impl InputEvent {
    /// Decodes one raw engine event.
    ///
    /// Total over all codepoints: a codepoint in the key-symbol table
    /// becomes that symbol, anything else becomes a character (invalid
    /// scalar values fall back to U+FFFD rather than failing). Position and
    /// modifier flags copy through unchanged.
    pub fn decode(raw: RawInput) -> Self {
        let code = match KeySymbol::from_code(raw.codepoint) {
            Some(sym) => EventCode::Key(sym),
            None => EventCode::Char(
                char::from_u32(raw.codepoint).unwrap_or(char::REPLACEMENT_CHARACTER),
            ),
        };
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::ALT, raw.alt);
        modifiers.set(Modifiers::SHIFT, raw.shift);
        modifiers.set(Modifiers::CTRL, raw.ctrl);
        InputEvent {
            code,
            row: raw.row,
            col: raw.col,
            modifiers,
            seqnum: raw.seqnum,
        }
    }
}

impl From<RawInput> for InputEvent {
    fn from(raw: RawInput) -> Self {
        InputEvent::decode(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KEY_BASE;

    fn raw(codepoint: u32) -> RawInput {
        RawInput {
            codepoint,
            row: 3,
            col: 7,
            alt: false,
            shift: false,
            ctrl: false,
            seqnum: 42,
        }
    }

    #[test]
    fn table_codepoints_decode_to_symbols() {
        for &sym in KeySymbol::ALL {
            let event = InputEvent::decode(raw(sym.code()));
            assert_eq!(event.code, EventCode::Key(sym));
        }
    }

    #[test]
    fn other_codepoints_decode_to_characters() {
        let event = InputEvent::decode(raw('q' as u32));
        assert_eq!(event.code, EventCode::Char('q'));
        assert_eq!((event.row, event.col), (3, 7));
        assert_eq!(event.seqnum, 42);
    }

    #[test]
    fn invalid_scalar_values_never_fail() {
        // Surrogate range is not a valid char but must still decode.
        let event = InputEvent::decode(raw(0xD800));
        assert_eq!(event.code, EventCode::Char(char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn modifiers_copy_through() {
        let mut r = raw('x' as u32);
        r.alt = true;
        r.ctrl = true;
        let event = InputEvent::decode(r);
        assert!(event.modifiers.contains(Modifiers::ALT | Modifiers::CTRL));
        assert!(!event.modifiers.contains(Modifiers::SHIFT));
    }

    #[test]
    fn accessors_split_by_kind() {
        assert_eq!(
            InputEvent::decode(raw(KEY_BASE + 2)).code.as_key(),
            Some(KeySymbol::Up)
        );
        assert_eq!(InputEvent::decode(raw('z' as u32)).code.as_char(), Some('z'));
    }
}
