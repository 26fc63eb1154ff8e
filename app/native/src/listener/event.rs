//! Raw window events as delivered by the `SetWinEventHook` callback.

use std::fmt;

use crate::native::WindowHandle;

// WinEvent constants, kept here so the translation is testable off Windows.
pub const EVENT_SYSTEM_FOREGROUND: u32 = 0x0003;
pub const EVENT_SYSTEM_MOVESIZESTART: u32 = 0x000A;
pub const EVENT_SYSTEM_MOVESIZEEND: u32 = 0x000B;
pub const EVENT_SYSTEM_MINIMIZESTART: u32 = 0x0016;
pub const EVENT_SYSTEM_MINIMIZEEND: u32 = 0x0017;
pub const EVENT_OBJECT_CREATE: u32 = 0x8000;
pub const EVENT_OBJECT_DESTROY: u32 = 0x8001;
pub const EVENT_OBJECT_SHOW: u32 = 0x8002;
pub const EVENT_OBJECT_HIDE: u32 = 0x8003;
pub const EVENT_OBJECT_LOCATIONCHANGE: u32 = 0x800B;
pub const EVENT_OBJECT_CLOAKED: u32 = 0x8017;
pub const EVENT_OBJECT_UNCLOAKED: u32 = 0x8018;

/// `OBJID_WINDOW`: the event is about the window itself, not a child object.
const OBJID_WINDOW: i32 = 0;
const CHILDID_SELF: i32 = 0;

/// The `(min, max)` ranges the window hooks are installed for.
pub const HOOKED_RANGES: [(u32, u32); 4] = [
    (EVENT_SYSTEM_FOREGROUND, EVENT_SYSTEM_FOREGROUND),
    (EVENT_SYSTEM_MOVESIZESTART, EVENT_SYSTEM_MOVESIZEEND),
    (EVENT_SYSTEM_MINIMIZESTART, EVENT_SYSTEM_MINIMIZEEND),
    (EVENT_OBJECT_CREATE, EVENT_OBJECT_UNCLOAKED),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowEventKind {
    Created,
    Shown,
    Destroyed,
    Hidden,
    Cloaked,
    Uncloaked,
    Foreground,
    MoveSizeStarted,
    MoveSizeEnded,
    LocationChanged,
    MinimizeStarted,
    MinimizeEnded,
}

impl WindowEventKind {
    #[must_use]
    pub const fn from_win_event(event: u32) -> Option<Self> {
        Some(match event {
            EVENT_OBJECT_CREATE => Self::Created,
            EVENT_OBJECT_SHOW => Self::Shown,
            EVENT_OBJECT_DESTROY => Self::Destroyed,
            EVENT_OBJECT_HIDE => Self::Hidden,
            EVENT_OBJECT_CLOAKED => Self::Cloaked,
            EVENT_OBJECT_UNCLOAKED => Self::Uncloaked,
            EVENT_SYSTEM_FOREGROUND => Self::Foreground,
            EVENT_SYSTEM_MOVESIZESTART => Self::MoveSizeStarted,
            EVENT_SYSTEM_MOVESIZEEND => Self::MoveSizeEnded,
            EVENT_OBJECT_LOCATIONCHANGE => Self::LocationChanged,
            EVENT_SYSTEM_MINIMIZESTART => Self::MinimizeStarted,
            EVENT_SYSTEM_MINIMIZEEND => Self::MinimizeEnded,
            _ => return None,
        })
    }

    /// Events that can introduce a window the store does not know yet.
    #[must_use]
    pub const fn may_add_window(self) -> bool {
        matches!(self, Self::Shown | Self::Uncloaked | Self::Foreground | Self::MinimizeEnded)
    }

    /// Events caused by a window changing its own position or size.
    #[must_use]
    pub const fn is_movement(self) -> bool {
        matches!(self, Self::LocationChanged | Self::MoveSizeStarted | Self::MoveSizeEnded)
    }
}

impl fmt::Display for WindowEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(self, f) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawWindowEvent {
    pub kind: WindowEventKind,
    pub window: WindowHandle,
}

impl RawWindowEvent {
    #[must_use]
    pub const fn new(kind: WindowEventKind, window: WindowHandle) -> Self { Self { kind, window } }

    /// Builds an event from the raw callback arguments.
    ///
    /// Returns `None` for events about child objects, null windows and event types
    /// the manager does not handle.
    #[must_use]
    pub fn from_hook(event: u32, hwnd: isize, id_object: i32, id_child: i32) -> Option<Self> {
        if hwnd == 0 || id_object != OBJID_WINDOW || id_child != CHILDID_SELF {
            return None;
        }
        WindowEventKind::from_win_event(event).map(|kind| Self::new(kind, WindowHandle(hwnd)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_and_null_events_are_dropped() {
        assert_eq!(RawWindowEvent::from_hook(EVENT_OBJECT_SHOW, 0, 0, 0), None);
        assert_eq!(RawWindowEvent::from_hook(EVENT_OBJECT_SHOW, 0x10, -4, 0), None);
        assert_eq!(RawWindowEvent::from_hook(EVENT_OBJECT_SHOW, 0x10, 0, 3), None);
        assert_eq!(
            RawWindowEvent::from_hook(EVENT_OBJECT_SHOW, 0x10, 0, 0),
            Some(RawWindowEvent::new(WindowEventKind::Shown, WindowHandle(0x10)))
        );
    }

    #[test]
    fn test_unhandled_event_types() {
        // EVENT_OBJECT_NAMECHANGE
        assert_eq!(RawWindowEvent::from_hook(0x800C, 0x10, 0, 0), None);
    }

    #[test]
    fn test_hooked_ranges_cover_every_kind() {
        let events = [
            EVENT_SYSTEM_FOREGROUND,
            EVENT_SYSTEM_MOVESIZESTART,
            EVENT_SYSTEM_MOVESIZEEND,
            EVENT_SYSTEM_MINIMIZESTART,
            EVENT_SYSTEM_MINIMIZEEND,
            EVENT_OBJECT_CREATE,
            EVENT_OBJECT_DESTROY,
            EVENT_OBJECT_SHOW,
            EVENT_OBJECT_HIDE,
            EVENT_OBJECT_LOCATIONCHANGE,
            EVENT_OBJECT_CLOAKED,
            EVENT_OBJECT_UNCLOAKED,
        ];
        for event in events {
            assert!(WindowEventKind::from_win_event(event).is_some());
            assert!(HOOKED_RANGES.iter().any(|(min, max)| (*min..=*max).contains(&event)));
        }
    }
}
