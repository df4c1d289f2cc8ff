//! Input events consumed by the sheet.

use std::time::Instant;

use crate::snap_point::SnapPoint;

/// Named keys the sheet reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Character input
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetEvent {
    /// Pointer pressed on the drag handle
    PointerDown { y: f32, time: Instant },
    /// Pointer moved while pressed
    PointerMove { y: f32, time: Instant },
    /// Pointer released
    PointerUp,
    /// Pointer interaction aborted by the host (e.g. touch cancel)
    PointerCancel,
    /// Key pressed
    KeyDown { key: Key },
    /// Viewport height changed
    Resize { height: f32 },
    /// Backdrop dimmer clicked
    BackdropClick,
    /// Programmatic request to move to a snap point
    SetSnapPoint(SnapPoint),
    /// Programmatic request to close
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled,
}

impl EventResponse {
    pub fn is_handled(&self) -> bool {
        matches!(self, EventResponse::Handled)
    }
}

impl SheetEvent {
    /// Pointer coordinate carried by this event, if any
    pub fn pointer_y(&self) -> Option<f32> {
        match self {
            SheetEvent::PointerDown { y, .. } | SheetEvent::PointerMove { y, .. } => Some(*y),
            _ => None,
        }
    }

    /// Whether this event is part of a pointer drag
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            SheetEvent::PointerDown { .. }
                | SheetEvent::PointerMove { .. }
                | SheetEvent::PointerUp
                | SheetEvent::PointerCancel
        )
    }
}
