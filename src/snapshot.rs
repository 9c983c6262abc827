//! Per-frame device state.
//!
//! [`DeviceState`] is what a device exposes between updates: index-addressed
//! [`Button`]s and [`Axis`] values with counts fixed by the device layout. The
//! application only ever sees it through a shared reference (or an owned clone in a
//! [`Snapshot`]), so nothing outside the device can mutate it.
//!
//! # Semantics
//! - A borrowed `DeviceState` reflects the most recent `update` and stays valid
//!   until the next one.
//! - Indexing past the configured counts panics, like slice indexing. Use the
//!   `get_*` accessors when the index comes from untrusted data.
//!
//! # Examples
//! ```
//! use framepoll::{DeviceClass, InputManager, MouseAxis, MouseButton, RawEvent};
//!
//! let mut input = InputManager::with_defaults();
//! input
//!     .enqueue(DeviceClass::Pointer, RawEvent::press(MouseButton::Left.index()))
//!     .unwrap();
//! input
//!     .enqueue(DeviceClass::Pointer, RawEvent::delta(MouseAxis::DeltaX.index(), 7))
//!     .unwrap();
//! input.update(0);
//!
//! let mouse = input.snapshot(DeviceClass::Pointer);
//! assert!(mouse.button(MouseButton::Left.index()).triggered());
//! assert_eq!(mouse.axis(MouseAxis::DeltaX.index()).delta(), Some(7));
//! ```

use crate::button::Button;
use crate::clock::Timestamp;
use crate::event::DeviceClass;
use serde::Serialize;

/// Value of one axis for the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Axis {
    /// Sum of this frame's deltas.
    Relative(i32),
    /// Normalized position in `[-1.0, 1.0]`.
    Absolute(f32),
}

impl Axis {
    /// Frame delta of a relative axis.
    #[inline]
    pub fn delta(self) -> Option<i32> {
        match self {
            Axis::Relative(d) => Some(d),
            Axis::Absolute(_) => None,
        }
    }

    /// Normalized position of an absolute axis.
    #[inline]
    pub fn position(self) -> Option<f32> {
        match self {
            Axis::Absolute(p) => Some(p),
            Axis::Relative(_) => None,
        }
    }

    /// Either kind as a float (relative deltas are not scaled).
    #[inline]
    pub fn value(self) -> f32 {
        match self {
            Axis::Relative(d) => d as f32,
            Axis::Absolute(p) => p,
        }
    }
}

/// Button and axis values of one device, as of its last update.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceState {
    class: DeviceClass,
    buttons: Vec<Button>,
    axes: Vec<Axis>,
}

impl DeviceState {
    pub(crate) fn new(class: DeviceClass, buttons: Vec<Button>, axes: Vec<Axis>) -> Self {
        Self {
            class,
            buttons,
            axes,
        }
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [Button], &mut [Axis]) {
        (&mut self.buttons, &mut self.axes)
    }

    #[inline]
    pub fn class(&self) -> DeviceClass {
        self.class
    }

    #[inline]
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    #[inline]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Button `index`. Panics if the device has no such button.
    #[inline]
    #[track_caller]
    pub fn button(&self, index: usize) -> &Button {
        assert!(
            index < self.buttons.len(),
            "{} has {} buttons, index {} is out of range",
            self.class,
            self.buttons.len(),
            index
        );
        &self.buttons[index]
    }

    #[inline]
    pub fn get_button(&self, index: usize) -> Option<&Button> {
        self.buttons.get(index)
    }

    /// Axis `index`. Panics if the device has no such axis.
    #[inline]
    #[track_caller]
    pub fn axis(&self, index: usize) -> Axis {
        assert!(
            index < self.axes.len(),
            "{} has {} axes, index {} is out of range",
            self.class,
            self.axes.len(),
            index
        );
        self.axes[index]
    }

    #[inline]
    pub fn get_axis(&self, index: usize) -> Option<Axis> {
        self.axes.get(index).copied()
    }

    /// Indices of every button currently held.
    pub fn held(&self) -> impl Iterator<Item = usize> + '_ {
        self.buttons
            .iter()
            .enumerate()
            .filter(|(_, b)| b.held())
            .map(|(i, _)| i)
    }

    /// Indices of every button that fired a repeat pulse this frame.
    pub fn repeating(&self) -> impl Iterator<Item = usize> + '_ {
        self.buttons
            .iter()
            .enumerate()
            .filter(|(_, b)| b.repeating())
            .map(|(i, _)| i)
    }
}

/// Owned copy of every class' state at one frame.
///
/// Cheap enough to clone for fan-out to other consumers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub frame_time: Timestamp,
    pub pointer: DeviceState,
    pub key_matrix: DeviceState,
    pub analog: DeviceState,
}

impl Snapshot {
    pub fn get(&self, class: DeviceClass) -> &DeviceState {
        match class {
            DeviceClass::Pointer => &self.pointer,
            DeviceClass::KeyMatrix => &self.key_matrix,
            DeviceClass::Analog => &self.analog,
        }
    }
}
