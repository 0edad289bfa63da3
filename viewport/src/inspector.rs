//! Pointer inspector: click-to-world readout with auto-hide.
//!
//! States are `Hidden -> Shown -> (timeout) -> Hidden`. A click while shown
//! replaces the readout and restarts the timeout.

#[cfg(test)]
#[path = "inspector_test.rs"]
mod inspector_test;

use std::fmt;
use std::time::Duration;

use crate::camera::{Point, Transform};
use crate::consts::READOUT_TIMEOUT;
use crate::timer::Debounce;

/// World coordinates under a click plus the zoom at the time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readout {
    pub world: Point,
    pub scale: f64,
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {:.1}, y: {:.1} (zoom {:.2})", self.world.x, self.world.y, self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ReadoutState {
    Hidden,
    Shown(Readout),
}

#[derive(Debug, Clone)]
pub struct PointerInspector {
    state: ReadoutState,
    hide: Debounce,
}

impl Default for PointerInspector {
    fn default() -> Self {
        Self::new(READOUT_TIMEOUT)
    }
}

impl PointerInspector {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { state: ReadoutState::Hidden, hide: Debounce::new(timeout) }
    }

    /// Map a primary click through the inverse transform and show it.
    pub fn click(&mut self, screen: Point, transform: &Transform, now: Duration) -> Readout {
        let readout = Readout { world: transform.to_world(screen), scale: transform.scale };
        self.state = ReadoutState::Shown(readout);
        self.hide.schedule(now);
        readout
    }

    /// Hide the readout once the timeout has elapsed. Returns true on the
    /// transition to hidden.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.hide.fire(now).is_none() {
            return false;
        }
        let was_shown = matches!(self.state, ReadoutState::Shown(_));
        self.state = ReadoutState::Hidden;
        was_shown
    }

    #[must_use]
    pub fn readout(&self) -> Option<Readout> {
        match self.state {
            ReadoutState::Shown(r) => Some(r),
            ReadoutState::Hidden => None,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.hide.deadline()
    }

    /// Drop the readout immediately, e.g. when a new drawing loads.
    pub fn clear(&mut self) {
        self.hide.cancel();
        self.state = ReadoutState::Hidden;
    }
}
