//! Raw events and device classes.
//!
//! framepoll represents hardware occurrences as small, device-local records
//! ([`RawEvent`]) tagged by the [`DeviceClass`] that should consume them. Events
//! carry no timestamp of their own: arrival order in the queue is the only
//! ordering, and the frame that drains them supplies the time.
//!
//! ## Value conventions
//! - **Buttons:** press/release transitions on a device-local index.
//! - **Relative axes** (pointer motion, wheel): signed integer deltas in raw OS
//!   units. Wheel deltas are signed; one detent is typically ±120.
//! - **Absolute axes** (sticks, triggers): raw integer samples, normalized by the
//!   device against the axis' full scale and dead zone.
//! - **Registers:** a whole controller state read at once. The analog device diffs
//!   it against its own `held` flags instead of receiving individual transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of input source. Each class owns exactly one device state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Mouse-like device: buttons plus relative motion/wheel axes.
    Pointer,
    /// Keyboard-like device: a matrix of keys, no axes.
    KeyMatrix,
    /// Controller with absolute sticks/triggers, fed by events or polled registers.
    Analog,
}

impl DeviceClass {
    /// Update order used by the aggregator.
    pub const ALL: [DeviceClass; 3] = [
        DeviceClass::Pointer,
        DeviceClass::KeyMatrix,
        DeviceClass::Analog,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DeviceClass::Pointer => "pointer",
            DeviceClass::KeyMatrix => "key matrix",
            DeviceClass::Analog => "analog",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of a button transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    Press,
    Release,
}

/// Whole-controller state read from an out-of-band register.
///
/// Bit `i` of `buttons` is button `i` of the receiving device; `samples[i]` is the
/// raw sample of absolute axis `i`. Fewer samples than axes leaves the remaining
/// axes at their last sample.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PadRegister {
    pub buttons: u32,
    pub samples: Vec<i32>,
}

impl PadRegister {
    pub fn new(buttons: u32, samples: Vec<i32>) -> Self {
        Self { buttons, samples }
    }

    /// Whether button `index` is down in this register.
    #[inline]
    pub fn is_down(&self, index: usize) -> bool {
        index < 32 && self.buttons & (1 << index) != 0
    }
}

/// One hardware occurrence, consumed exactly once by the device it was routed to.
#[derive(Clone, Debug, PartialEq)]
pub enum RawEvent {
    /// A button went down or up.
    Button { index: usize, transition: Transition },

    /// Relative motion to accumulate into an axis for the current frame.
    AxisDelta { axis: usize, delta: i32 },

    /// Latest raw sample of an absolute axis.
    AxisSample { axis: usize, sample: i32 },

    /// A polled controller state (analog class only).
    Register(PadRegister),
}

impl RawEvent {
    #[inline]
    pub fn press(index: usize) -> Self {
        RawEvent::Button {
            index,
            transition: Transition::Press,
        }
    }

    #[inline]
    pub fn release(index: usize) -> Self {
        RawEvent::Button {
            index,
            transition: Transition::Release,
        }
    }

    #[inline]
    pub fn delta(axis: usize, delta: i32) -> Self {
        RawEvent::AxisDelta { axis, delta }
    }

    #[inline]
    pub fn sample(axis: usize, sample: i32) -> Self {
        RawEvent::AxisSample { axis, sample }
    }

    /// Short label used in errors and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawEvent::Button { .. } => "button transition",
            RawEvent::AxisDelta { .. } => "axis delta",
            RawEvent::AxisSample { .. } => "absolute axis sample",
            RawEvent::Register(_) => "register snapshot",
        }
    }
}
