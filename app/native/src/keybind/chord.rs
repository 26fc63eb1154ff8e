//! Key chords: a set of modifiers plus one virtual key.
//!
//! Chord strings are `+`-separated and case-insensitive, e.g. `"LWin+Shift+H"` or
//! `"Ctrl + Alt + Left"`. A bare modifier name (`Ctrl`, `Shift`, `Alt`, `Win`) means the
//! left-hand key.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::native::KeyboardState;

/// Bit set of left- and right-hand modifier keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const LCONTROL: Self = Self(1);
    pub const RCONTROL: Self = Self(1 << 1);
    pub const LSHIFT: Self = Self(1 << 2);
    pub const RSHIFT: Self = Self(1 << 3);
    pub const LALT: Self = Self(1 << 4);
    pub const RALT: Self = Self(1 << 5);
    pub const LWIN: Self = Self(1 << 6);
    pub const RWIN: Self = Self(1 << 7);

    const RIGHT_MASK: u8 = 0b1010_1010;

    /// Display order, paired with the virtual key read from keyboard state.
    pub(crate) const KEYS: [(Self, u8, &'static str); 8] = [
        (Self::LWIN, vk::LWIN, "LWin"),
        (Self::RWIN, vk::RWIN, "RWin"),
        (Self::LCONTROL, vk::LCONTROL, "LCtrl"),
        (Self::RCONTROL, vk::RCONTROL, "RCtrl"),
        (Self::LSHIFT, vk::LSHIFT, "LShift"),
        (Self::RSHIFT, vk::RSHIFT, "RShift"),
        (Self::LALT, vk::LMENU, "LAlt"),
        (Self::RALT, vk::RMENU, "RAlt"),
    ];

    #[must_use]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    #[must_use]
    pub const fn is_empty(self) -> bool { self.0 == 0 }

    /// Folds every right-hand modifier onto its left-hand twin.
    #[must_use]
    pub const fn unified(self) -> Self { Self((self.0 & !Self::RIGHT_MASK) | ((self.0 & Self::RIGHT_MASK) >> 1)) }

    /// The modifiers whose high bit is set in a `GetKeyboardState` buffer.
    #[must_use]
    pub fn from_keyboard_state(state: &KeyboardState) -> Self {
        Self::KEYS
            .iter()
            .filter(|(_, key, _)| state[usize::from(*key)] & 0x80 != 0)
            .fold(Self::NONE, |acc, (modifier, _, _)| acc | *modifier)
    }

    fn from_name(name: &str) -> Option<Self> {
        let modifier = match name {
            "ctrl" | "control" | "lctrl" | "lcontrol" => Self::LCONTROL,
            "rctrl" | "rcontrol" => Self::RCONTROL,
            "shift" | "lshift" => Self::LSHIFT,
            "rshift" => Self::RSHIFT,
            "alt" | "lalt" => Self::LALT,
            "ralt" | "altgr" => Self::RALT,
            "win" | "lwin" | "super" => Self::LWIN,
            "rwin" => Self::RWIN,
            _ => return None,
        };
        Some(modifier)
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (modifier, _, name) in Self::KEYS {
            if self.contains(modifier) {
                if !first {
                    f.write_str(" + ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Virtual-key codes used by chords.
pub mod vk {
    pub const BACK: u8 = 0x08;
    pub const TAB: u8 = 0x09;
    pub const RETURN: u8 = 0x0D;
    pub const ESCAPE: u8 = 0x1B;
    pub const SPACE: u8 = 0x20;
    pub const PRIOR: u8 = 0x21;
    pub const NEXT: u8 = 0x22;
    pub const END: u8 = 0x23;
    pub const HOME: u8 = 0x24;
    pub const LEFT: u8 = 0x25;
    pub const UP: u8 = 0x26;
    pub const RIGHT: u8 = 0x27;
    pub const DOWN: u8 = 0x28;
    pub const INSERT: u8 = 0x2D;
    pub const DELETE: u8 = 0x2E;
    pub const LWIN: u8 = 0x5B;
    pub const RWIN: u8 = 0x5C;
    pub const F1: u8 = 0x70;
    pub const LSHIFT: u8 = 0xA0;
    pub const RSHIFT: u8 = 0xA1;
    pub const LCONTROL: u8 = 0xA2;
    pub const RCONTROL: u8 = 0xA3;
    pub const LMENU: u8 = 0xA4;
    pub const RMENU: u8 = 0xA5;

    /// Generic and sided modifier keys. A chord never ends in one of these.
    #[must_use]
    pub const fn is_modifier(key: u8) -> bool {
        matches!(key, 0x10..=0x12 | LWIN | RWIN | LSHIFT..=RMENU)
    }
}

const NAMED_KEYS: [(&str, u8); 28] = [
    ("Backspace", vk::BACK),
    ("Tab", vk::TAB),
    ("Enter", vk::RETURN),
    ("Escape", vk::ESCAPE),
    ("Space", vk::SPACE),
    ("PageUp", vk::PRIOR),
    ("PageDown", vk::NEXT),
    ("End", vk::END),
    ("Home", vk::HOME),
    ("Left", vk::LEFT),
    ("Up", vk::UP),
    ("Right", vk::RIGHT),
    ("Down", vk::DOWN),
    ("Insert", vk::INSERT),
    ("Delete", vk::DELETE),
    (";", 0xBA),
    ("=", 0xBB),
    (",", 0xBC),
    ("-", 0xBD),
    (".", 0xBE),
    ("/", 0xBF),
    ("`", 0xC0),
    ("[", 0xDB),
    ("\\", 0xDC),
    ("]", 0xDD),
    ("'", 0xDE),
    ("Esc", vk::ESCAPE),
    ("Plus", 0xBB),
];

fn key_from_name(name: &str) -> Option<u8> {
    if let [c] = name.as_bytes()
        && c.is_ascii_alphanumeric()
    {
        return Some(c.to_ascii_uppercase());
    }
    if let Some(number) = name.strip_prefix(['f', 'F'])
        && let Ok(n @ 1..=24) = number.parse::<u8>()
    {
        return Some(vk::F1 + n - 1);
    }
    match name.to_ascii_lowercase().as_str() {
        "return" => return Some(vk::RETURN),
        "del" => return Some(vk::DELETE),
        _ => {}
    }
    NAMED_KEYS.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, code)| *code)
}

fn key_name(key: u8) -> String {
    match key {
        b'0'..=b'9' | b'A'..=b'Z' => char::from(key).to_string(),
        k if (vk::F1..vk::F1 + 24).contains(&k) => format!("F{}", k - vk::F1 + 1),
        k => NAMED_KEYS
            .iter()
            .find(|(_, code)| *code == k)
            .map_or_else(|| format!("0x{k:02X}"), |(name, _)| (*name).to_string()),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeybindParseError {
    #[error("empty key chord")]
    Empty,

    #[error("unknown key '{key}' in chord '{chord}'")]
    UnknownKey { chord: String, key: String },

    #[error("chord '{0}' has no key, only modifiers")]
    MissingKey(String),

    #[error("chord '{0}' has more than one non-modifier key")]
    MultipleKeys(String),
}

/// A set of modifiers plus one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Chord {
    pub modifiers: Modifiers,
    pub key: u8,
}

impl Chord {
    #[must_use]
    pub const fn new(modifiers: Modifiers, key: u8) -> Self { Self { modifiers, key } }

    #[must_use]
    pub const fn unified(self) -> Self { Self { modifiers: self.modifiers.unified(), key: self.key } }
}

impl FromStr for Chord {
    type Err = KeybindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(KeybindParseError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        let mut key = None;

        for part in s.split('+').map(str::trim).filter(|part| !part.is_empty()) {
            if let Some(modifier) = Modifiers::from_name(&part.to_ascii_lowercase()) {
                modifiers = modifiers | modifier;
                continue;
            }
            let code = key_from_name(part).ok_or_else(|| KeybindParseError::UnknownKey {
                chord: s.to_string(),
                key: part.to_string(),
            })?;
            if key.replace(code).is_some() {
                return Err(KeybindParseError::MultipleKeys(s.to_string()));
            }
        }

        key.map(|key| Self::new(modifiers, key)).ok_or_else(|| KeybindParseError::MissingKey(s.to_string()))
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers.is_empty() {
            write!(f, "{} + ", self.modifiers)?;
        }
        f.write_str(&key_name(self.key))
    }
}

impl Serialize for Chord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Chord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
