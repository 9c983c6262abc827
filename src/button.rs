//! Button lifecycle and repeat timing.
//!
//! A [`Button`] carries four flags:
//! - `held`: the button is down at the end of this frame.
//! - `triggered`: it went down during this frame.
//! - `released`: it went up during this frame.
//! - `repeating`: a repeat pulse fired this frame (always on the trigger frame,
//!   then once per repeat period after the initial delay).
//!
//! After every frame `triggered => held` and `released => !held`, and the two
//! edges are never set together.

use crate::clock::Timestamp;
use crate::config::RepeatConfig;
use serde::Serialize;

/// Per-frame state of one button. Read-only outside the owning device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Button {
    held: bool,
    triggered: bool,
    released: bool,
    repeating: bool,
}

impl Button {
    #[inline]
    pub fn held(&self) -> bool {
        self.held
    }

    #[inline]
    pub fn triggered(&self) -> bool {
        self.triggered
    }

    #[inline]
    pub fn released(&self) -> bool {
        self.released
    }

    #[inline]
    pub fn repeating(&self) -> bool {
        self.repeating
    }

    /// Clear the single-frame edges. `held` and `repeating` are left alone;
    /// `repeating` is recomputed after the queue drain.
    #[inline]
    pub(crate) fn begin_frame(&mut self) {
        self.triggered = false;
        self.released = false;
    }

    /// Apply a press.
    ///
    /// Invariant: a press on a button that is already held is an OS auto-repeat
    /// echo and never re-triggers it. Returns `false` when the press was ignored.
    pub(crate) fn press(&mut self, timing: &mut RepeatTiming, now: Timestamp) -> bool {
        if self.held {
            return false;
        }
        self.held = true;
        self.triggered = true;
        timing.restart(now);
        true
    }

    /// Apply a release. A press earlier in the same frame loses its trigger edge.
    pub(crate) fn release(&mut self) {
        self.held = false;
        self.triggered = false;
        self.released = true;
    }

    /// Recompute `repeating` for the frame at `now`.
    pub(crate) fn update_repeat(
        &mut self,
        timing: &mut RepeatTiming,
        now: Timestamp,
        repeat: &RepeatConfig,
    ) {
        self.repeating = self.triggered;
        if self.repeating || !self.held {
            return;
        }
        self.repeating = timing.advance(now, repeat);
    }
}

/// Trigger time and repeat progress of one held button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RepeatTiming {
    trigger_timestamp: Timestamp,
    repeat_count: u64,
}

impl RepeatTiming {
    #[inline]
    fn restart(&mut self, now: Timestamp) {
        self.trigger_timestamp = now;
        self.repeat_count = 0;
    }

    /// Move the repeat count up to the number of periods elapsed past the delay.
    /// Returns whether that count grew, i.e. whether a pulse is due this frame.
    ///
    /// Counting against the trigger time instead of per call keeps the cadence
    /// independent of how often frames are sampled; skipped boundaries coalesce
    /// into a single pulse.
    fn advance(&mut self, now: Timestamp, repeat: &RepeatConfig) -> bool {
        let elapsed = now.saturating_sub(self.trigger_timestamp);
        let Some(post_delay) = elapsed.checked_sub(repeat.delay_ms()) else {
            return false;
        };
        let target = post_delay / repeat.period_ms();
        let pulse = self.repeat_count < target;
        self.repeat_count = target;
        pulse
    }
}
