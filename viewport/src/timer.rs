//! Cancelable one-shot timers driven by host-supplied time.
//!
//! The engine never sleeps or spawns. A [`Debounce`] records a deadline; the
//! host polls it with the current monotonic time and it fires at most once per
//! schedule. Scheduling again replaces the pending token, so a superseded
//! schedule can never fire.

#[cfg(test)]
#[path = "timer_test.rs"]
mod timer_test;

use std::time::Duration;

/// Identifies one scheduling of a [`Debounce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

/// A single pending deadline that is rescheduled, never queued.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    pending: Option<(TimerToken, Duration)>,
    issued: u64,
}

impl Debounce {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None, issued: 0 }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending deadline and schedule a new one at `now + delay`,
    /// saturating at `Duration::MAX`.
    pub fn schedule(&mut self, now: Duration) -> TimerToken {
        self.issued += 1;
        let token = TimerToken(self.issued);
        self.pending = Some((token, now.saturating_add(self.delay)));
        token
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending schedule will fire, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.map(|(_, at)| at)
    }

    /// Fire the pending schedule if its deadline has passed.
    pub fn fire(&mut self, now: Duration) -> Option<TimerToken> {
        match self.pending {
            Some((token, at)) if now >= at => {
                self.pending = None;
                Some(token)
            }
            _ => None,
        }
    }
}
