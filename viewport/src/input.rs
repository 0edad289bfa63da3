//! Input model: modifier keys, mouse buttons, wheel deltas, and the pointer
//! gesture state machine.
//!
//! A press stays `Pressed` until it either moves beyond the click slop (and
//! becomes a pan) or is released in place (and becomes a click).

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::consts::CLICK_SLOP_PX;

/// Modifier keys as reported with a pointer or wheel event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left button, or a one-finger touch.
    Primary,
    Middle,
    Secondary,
}

impl Button {
    /// Whether this press may pan or click the viewport. Ctrl-clicks are
    /// left to the host (context menus on some platforms).
    #[must_use]
    pub fn drives_viewport(self, modifiers: Modifiers) -> bool {
        self == Self::Primary && !modifiers.ctrl
    }
}

/// Scroll delta in pixels. Only `dy` zooms; positive scrolls down (zooms out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    pub dx: f64,
    pub dy: f64,
}

/// The pointer gesture in progress.
#[derive(Debug, Clone, Copy, Default)]
pub enum InputState {
    #[default]
    Idle,
    /// The primary button is down.
    Pressed {
        /// Screen position of the pointer-down.
        origin: Point,
        /// Screen position of the previous pointer event, used for pan deltas.
        last: Point,
        /// Set once the pointer has left the click slop.
        dragging: bool,
    },
}

impl InputState {
    #[must_use]
    pub fn press(at: Point) -> Self {
        Self::Pressed { origin: at, last: at, dragging: false }
    }

    /// True once a press has become a pan.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Pressed { dragging: true, .. })
    }
}

/// Whether `to` is far enough from `from` to count as a drag.
#[must_use]
pub fn exceeds_slop(from: Point, to: Point) -> bool {
    (to.x - from.x).hypot(to.y - from.y) > CLICK_SLOP_PX
}
