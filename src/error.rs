//! Error types for framepoll.
//!
//! Everything here is a contract or configuration problem caught at a boundary
//! (construction, configuration setters, [`InputManager::enqueue`]). Once an event
//! sits in a device queue it is known to be valid, so [`Device::update`] itself
//! cannot fail.
//!
//! [`InputManager::enqueue`]: crate::manager::InputManager::enqueue
//! [`Device::update`]: crate::device::Device::update

use crate::event::DeviceClass;
use thiserror::Error;

/// Errors reported by configuration and event injection.
#[derive(Error, Debug)]
pub enum InputError {
    /// A device layout asked for more buttons than its class supports.
    #[error("{class} supports at most {max} buttons, layout asked for {requested}")]
    InvalidButtonCount {
        class: DeviceClass,
        requested: usize,
        max: usize,
    },

    /// A device layout asked for more axes than its class supports.
    #[error("{class} supports at most {max} axes, layout asked for {requested}")]
    InvalidAxisCount {
        class: DeviceClass,
        requested: usize,
        max: usize,
    },

    /// Repeat period must be at least one millisecond.
    #[error("repeat period must be greater than zero")]
    ZeroRepeatPeriod,

    /// Dead zone outside `[0, 1]` (or NaN).
    #[error("dead zone for {class} axis {axis} must be within [0, 1], got {value}")]
    InvalidDeadZone {
        class: DeviceClass,
        axis: usize,
        value: f32,
    },

    /// Absolute axes need a positive, finite full-scale value.
    #[error("full scale for {class} axis {axis} must be positive and finite, got {value}")]
    InvalidFullScale {
        class: DeviceClass,
        axis: usize,
        value: f32,
    },

    /// Absolute axes only exist on the analog class.
    #[error("{class} axis {axis} cannot be absolute")]
    AbsoluteAxisNotAllowed { class: DeviceClass, axis: usize },

    /// Dead zones only apply to absolute axes.
    #[error("{class} axis {axis} is relative and has no dead zone")]
    NotAbsoluteAxis { class: DeviceClass, axis: usize },

    /// Event or accessor addressed a button the device does not have.
    #[error("{class} has {count} buttons, index {index} is out of range")]
    ButtonOutOfRange {
        class: DeviceClass,
        index: usize,
        count: usize,
    },

    /// Event or accessor addressed an axis the device does not have.
    #[error("{class} has {count} axes, index {index} is out of range")]
    AxisOutOfRange {
        class: DeviceClass,
        index: usize,
        count: usize,
    },

    /// The event kind makes no sense for this class (e.g. an absolute sample sent
    /// to a relative axis, or a register snapshot sent to the key matrix).
    #[error("{class} cannot accept {event}")]
    UnsupportedEvent {
        class: DeviceClass,
        event: &'static str,
    },

    /// A polled register carried more samples than the device has axes.
    #[error("{class} register carries {samples} samples but the device has {axes} axes")]
    RegisterShape {
        class: DeviceClass,
        samples: usize,
        axes: usize,
    },

    /// Configuration text could not be parsed.
    #[error("failed to parse input configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be written back out.
    #[error("failed to serialize input configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, InputError>;
